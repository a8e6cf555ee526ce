use crate::{
	dice::Faces,
	parse::{DiceSpec, FaceSpec},
};

fn spec(input: &str) -> DiceSpec {
	input.parse().unwrap()
}

#[test]
fn counts() {
	assert_eq!(spec("3d6").count, Some(3));
	assert_eq!(spec("-2d8").count, Some(-2));
	assert_eq!(spec("d6").count, None);
	assert_eq!(spec("d6").with_default_count(2).count, Some(2));
	assert_eq!(spec("4d6").with_default_count(2).count, Some(4));
}

#[test]
fn face_specifiers() {
	assert_eq!(spec("1d20").faces, FaceSpec::Sides(20));
	assert_eq!(spec("2D").faces, FaceSpec::Omitted);
	assert_eq!(spec("d%").faces, FaceSpec::Percent);
	assert_eq!(spec("4dF").faces, FaceSpec::Fudge);
	assert_eq!(spec("1dS").faces, FaceSpec::Stunt);
	assert_eq!(spec("1d66%").faces, FaceSpec::Composite(vec![6, 6]));
	assert_eq!(spec("2d[1, 3,5]").faces, FaceSpec::List(vec![1, 3, 5]));
	assert_eq!(spec("d[2-5]").faces, FaceSpec::Range(2, 5));
	assert_eq!(spec("d[-3--1]").faces, FaceSpec::Range(-3, -1));
}

#[test]
fn invalid_literals() {
	assert!("1d0".parse::<DiceSpec>().is_err());
	assert!("1d6x".parse::<DiceSpec>().is_err());
	assert!("1d[]".parse::<DiceSpec>().is_err());
	assert!("6".parse::<DiceSpec>().is_err());
}

#[test]
fn possibilities() {
	assert_eq!(FaceSpec::Sides(4).possibilities(), Faces::Range { min: 1, max: 4 });
	assert_eq!(FaceSpec::Sides(-3).possibilities(), Faces::Range { min: -3, max: -1 });
	assert_eq!(FaceSpec::Percent.possibilities().distinct(), 100);
	assert_eq!(FaceSpec::Fudge.possibilities(), Faces::Range { min: -1, max: 1 });
	assert_eq!(FaceSpec::Range(5, 3).possibilities(), Faces::Range { min: 3, max: 5 });
	assert_eq!(FaceSpec::List(vec![4, 1, 4]).possibilities(), Faces::List(vec![4, 1, 4]));
	assert_eq!(FaceSpec::List(vec![4, 1, 4]).possibilities().distinct(), 2);
	assert_eq!(FaceSpec::Composite(vec![6, 6]).possibilities(), Faces::None);
}

#[test]
fn display() {
	assert_eq!(spec("3d6").to_string(), "3d6");
	assert_eq!(spec("d[2-5]").to_string(), "d[2-5]");
	assert_eq!(spec("2d[1, 3,5]").to_string(), "2d[1,3,5]");
	assert_eq!(spec("1d66%").to_string(), "1d66%");
}
