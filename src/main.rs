use std::{
	env, fs,
	io::{self, Write},
	process::ExitCode,
};

use ariadne::{Color, Label, Report, ReportKind, Source};
use astragal::{
	dice::roller::FastRand,
	engine::{Error, Outcome},
	Engine, Rollable, Settings,
};

fn main() -> ExitCode {
	pretty_env_logger::init();

	let settings = match load_settings() {
		Ok(settings) => settings,
		Err(err) => {
			eprintln!("Settings error: {err}");
			return ExitCode::FAILURE;
		}
	};

	let args = env::args();
	let input = if args.len() > 1 {
		// Obtain the expression by combining all args passed to the executable, so that it can be left unquoted
		// even with spaces. The first argument is ignored since it is typically the name of the executable itself.
		args.skip(1).collect::<Vec<String>>().join(" ")
	} else {
		let mut lines = io::stdin().lines();

		// If there isn't already input available in stdin, display a prompt for it
		if lines.size_hint().1.is_none() {
			print!("Enter dice expression: ");
			if io::stdout().flush().is_err() {
				return ExitCode::FAILURE;
			}
		}

		// Grab the first line available from stdin
		match lines.next() {
			Some(Ok(line)) => line,
			_ => return ExitCode::FAILURE,
		}
	};

	println!("Input: {input}");

	let engine = Engine::from_settings(&settings);
	let mut rollable = match engine.roller(&input, "") {
		Ok(rollable) => rollable,
		Err(err) => {
			report(&input, &err);
			return ExitCode::FAILURE;
		}
	};

	if settings.average {
		if let Rollable::Dice(expr) = &rollable {
			match expr.average() {
				Some(average) => println!("Average: {}", settings.format_result(average)),
				None => println!("Average: not available"),
			}
			return ExitCode::SUCCESS;
		}
	}

	let mut rng = FastRand::default();
	match rollable.roll_sync(&mut rng) {
		Ok(Outcome::Number(total)) => {
			println!("Total: {}", settings.format_result(total));
			if let Rollable::Dice(expr) = &rollable {
				println!("Rolled: {}", expr.display());
				if let (Some(min), Some(max)) = (expr.min(), expr.max()) {
					println!("Range: {min} to {max}");
				}
				if let Some(record) = expr.record() {
					match serde_json::to_string(&record) {
						Ok(json) => println!("Record: {json}"),
						Err(err) => eprintln!("Record error: {err}"),
					}
				}
			}
		}
		Ok(outcome) => println!("Result: {outcome}"),
		Err(err) => {
			eprintln!("Roll error: {err}");
			return ExitCode::FAILURE;
		}
	}

	ExitCode::SUCCESS
}

/// Loads settings from the file named by `ASTRAGAL_CONFIG`, falling back to the defaults.
fn load_settings() -> Result<Settings, String> {
	let Ok(path) = env::var("ASTRAGAL_CONFIG") else {
		return Ok(Settings::default());
	};

	let source = fs::read_to_string(&path).map_err(|err| format!("{path}: {err}"))?;
	Settings::from_toml(&source).map_err(|err| format!("{path}: {err}"))
}

/// Prints an error, pointing at the offending part of the input for tokenizing errors.
fn report(input: &str, err: &Error) {
	let Error::Lex(lex) = err else {
		eprintln!("Error: {err}");
		return;
	};

	let span = lex.span();
	let printed = Report::build(ReportKind::Error, ("input", span.clone()))
		.with_message("Invalid dice expression")
		.with_label(
			Label::new(("input", span))
				.with_message(lex.to_string())
				.with_color(Color::Red),
		)
		.finish()
		.eprint(("input", Source::from(input)));

	if printed.is_err() {
		eprintln!("Error: {err}");
	}
}
