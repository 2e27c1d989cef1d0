//! Ready-made template helpers.
//!
//! None of these are registered by default: pick the ones you want and hand
//! them to [`Builder::with_helpers`](crate::Builder::with_helpers).

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
};

/// Pad a string with a given character or string until it meets the specified
/// length.
///
/// Usage:
///
/// ```handlebars
/// {{ pad "2" "0" 2 }}
/// ```
///
/// Produces `02`. Parameters are in the format
/// `{{ pad string paddingCharOrString desiredMinLength }}`
pub fn pad(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = string_param(h, 0, "pad")?;
    let padding = string_param(h, 1, "pad")?;
    let min_len = h
        .param(2)
        .and_then(|p| p.value().as_u64())
        .ok_or_else(|| RenderError::new("pad: desired minimum length must be an integer"))?
        as usize;
    if padding.is_empty() {
        return Err(RenderError::new("pad: padding must not be empty"));
    }
    let mut result = value.to_string();
    while result.chars().count() < min_len {
        result.insert_str(0, padding);
    }
    out.write(&result)?;
    Ok(())
}

/// Upper-case a string.
///
/// Usage:
///
/// ```handlebars
/// {{ upper "satchel" }}
/// ```
///
/// Produces `SATCHEL`.
pub fn upper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = string_param(h, 0, "upper")?;
    out.write(&value.to_uppercase())?;
    Ok(())
}

fn string_param<'a>(h: &'a Helper, index: usize, helper: &str) -> Result<&'a str, RenderError> {
    h.param(index)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| RenderError::new(format!("{}: parameter {} must be a string", helper, index)))
}

#[cfg(test)]
mod test {
    use handlebars::Handlebars;
    use serde_json::json;

    use super::*;

    fn registry() -> Handlebars<'static> {
        let mut hb = Handlebars::new();
        hb.register_helper("pad", Box::new(pad));
        hb.register_helper("upper", Box::new(upper));
        hb
    }

    #[test]
    fn pad_prefixes_to_minimum_length() {
        let mut hb = registry();
        hb.register_template_string("t", "{{pad value \"0\" 2}}").unwrap();
        assert_eq!(hb.render("t", &json!({"value": "2"})).unwrap(), "02");
        assert_eq!(hb.render("t", &json!({"value": "123"})).unwrap(), "123");
    }

    #[test]
    fn pad_rejects_non_string_values() {
        let mut hb = registry();
        hb.register_template_string("t", "{{pad value \"0\" 2}}").unwrap();
        assert!(hb.render("t", &json!({"value": 2})).is_err());
    }

    #[test]
    fn upper_uppercases() {
        let mut hb = registry();
        hb.register_template_string("t", "{{upper value}}").unwrap();
        assert_eq!(hb.render("t", &json!({"value": "abc"})).unwrap(), "ABC");
    }
}
