//! jq pre-filtering of input documents (jaq).
//!
//! Lets callers carve samples out of wrapper documents before inference,
//! e.g. `--jq '.data.items[]'` to infer over a response's payload rows.

use anyhow::{Result, anyhow};
use jaq_core::{Compiler, Ctx, RcIter, compile::Undefined, load};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over one document and collect every produced value as
/// JSON text, in production order.
pub fn apply_filter(filter_src: &str, input: &Value) -> Result<Vec<String>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File {
        code: filter_src,
        path: (),
    };

    let modules = loader.load(&arena, program).map_err(parse_errors)?;
    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut produced = Vec::new();
    for item in filter.run((Ctx::new([], &inputs), Val::from(input.clone()))) {
        let val = item.map_err(|err| anyhow!("jq filter failed: {err:?}"))?;
        produced.push(val.to_string()); // Val renders as JSON text
    }
    Ok(produced)
}

fn parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> anyhow::Error {
    let mut rendered = String::new();
    for (file, err) in errs {
        rendered.push_str(&format!("jq parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow!(rendered)
}

fn undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> anyhow::Error {
    let mut rendered = String::new();
    for (file, names) in errs {
        for (name, undefined) in names {
            rendered.push_str(&format!(
                "jq undefined `{name}`: {undefined:?} in `{}`\n",
                file.code
            ));
        }
    }
    anyhow!(rendered)
}
