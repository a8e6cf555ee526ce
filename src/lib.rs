#![doc = pretty_readme::docify!("README.md", "https://docs.rs/astragal/latest/astragal/", "./")]
#![expect(
	clippy::tabs_in_doc_comments,
	reason = "Consistency with source, user-configurability & accessibility"
)]
#![deny(macro_use_extern_crate, meta_variable_misuse, unit_bindings)]
#![warn(
	explicit_outlives_requirements,
	missing_docs,
	missing_debug_implementations,
	unreachable_pub,
	unused_crate_dependencies,
	unused_qualifications,
	clippy::pedantic,
	clippy::absolute_paths,
	clippy::allow_attributes,
	clippy::allow_attributes_without_reason,
	clippy::cfg_not_test,
	clippy::clone_on_ref_ptr,
	clippy::cognitive_complexity,
	clippy::dbg_macro,
	clippy::empty_enum_variants_with_brackets,
	clippy::empty_structs_with_brackets,
	clippy::exhaustive_enums,
	clippy::exhaustive_structs,
	clippy::exit,
	clippy::expect_used,
	clippy::filetype_is_file,
	clippy::fn_to_numeric_cast_any,
	clippy::get_unwrap,
	clippy::if_then_some_else_none,
	clippy::infinite_loop,
	clippy::lossy_float_literal,
	clippy::map_err_ignore,
	clippy::mutex_atomic,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::print_stderr,
	clippy::print_stdout,
	clippy::rc_buffer,
	clippy::rc_mutex,
	clippy::redundant_type_annotations,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::same_name_method,
	clippy::self_named_module_files,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_lit_chars_any,
	clippy::suspicious_xor_used_as_pow,
	clippy::tests_outside_test_module,
	clippy::try_err,
	clippy::undocumented_unsafe_blocks,
	clippy::unnecessary_self_imports,
	clippy::unneeded_field_pattern,
	clippy::unused_result_ok,
	clippy::unwrap_in_result,
	clippy::unwrap_used,
	clippy::verbose_file_reads
)]

pub mod dice;
pub mod engine;
pub mod expr;
pub mod lex;
pub mod lookup;
pub mod narrative;
pub mod parse;
pub mod record;
pub mod reduce;
#[cfg(feature = "render")]
pub mod render;
pub mod settings;

pub use dice::Die;
pub use engine::{Engine, Error, Rollable};
pub use expr::Expression;
pub use lex::{Lexer, Token, TokenKind};
pub use settings::Settings;

#[cfg(test)]
mod tests;

#[cfg(feature = "build-binary")]
use ariadne as _;
#[cfg(feature = "build-binary")]
use pretty_env_logger as _;
#[cfg(feature = "build-binary")]
use serde_json as _;
#[cfg(test)]
use criterion as _;
