use std::hint::black_box;

use astragal::{dice::roller::FastRand, lex::Lexer, Engine, Expression};
use criterion::{criterion_group, criterion_main, Criterion};

fn build(lexer: &Lexer, input: &str) -> Expression {
	Expression::build(input, lexer.parse(input).unwrap()).unwrap()
}

fn tokenizing(c: &mut Criterion) {
	let lexer = Lexer::default();
	c.bench_function("tokenize basic", |b| b.iter(|| lexer.tokenize(black_box("4d8 + 4")).unwrap()));
	c.bench_function("tokenize complex", |b| {
		b.iter(|| {
			lexer
				.parse(black_box("4d8!kh3 + 2d10r<3 * (-3d6 - 6 / 2) + 4d6>=5-=1"))
				.unwrap()
		});
	});
	c.bench_function("tokenize narrative", |b| b.iter(|| lexer.tokenize(black_box("2g 1y 3p 1s")).unwrap()));
}

fn rolling(c: &mut Criterion) {
	let lexer = Lexer::default();
	let mut rng = FastRand::with_seed(0x750c_38d5_7440);

	let mut basic = build(&lexer, "4d8 + 4");
	c.bench_function("roll basic", |b| b.iter(|| basic.roll_sync(&mut rng).unwrap()));

	let mut exploding = build(&lexer, "10d6!!i + 8d6!kh4 + 6d6ri");
	c.bench_function("roll modifiers", |b| b.iter(|| exploding.roll_sync(&mut rng).unwrap()));

	let mut cursed = build(&lexer, "999d444");
	c.bench_function("roll cursed dice", |b| b.iter(|| cursed.roll_sync(&mut rng).unwrap()));
}

fn end_to_end(c: &mut Criterion) {
	let engine = Engine::default();
	let mut rng = FastRand::with_seed(0x750c_38d5_7440);
	c.bench_function("e2e complex", |b| {
		b.iter(|| {
			engine
				.roller(black_box("4d8! + 2d10 * (-3d6 - 6 / 2) + 1d66%"), "")
				.unwrap()
				.roll_sync(&mut rng)
				.unwrap()
		});
	});
}

criterion_group!(benches, tokenizing, rolling, end_to_end);
criterion_main!(benches);
