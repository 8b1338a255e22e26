//! Lightweight `{{$name}}` prompt templating.

use std::collections::HashMap;

use crate::errors::Error;

/// Prompt used by `ask` to ground an answer in recalled memories.
pub const GROUNDED_ANSWER_TEMPLATE: &str = "\
Answer the question using only the information below.
If the information does not answer the question, say so plainly.

Information:
{{$context}}

Question: {{$question}}
Answer:";

/// Render a template, substituting each `{{$name}}` placeholder.
///
/// # Errors
///
/// Returns `Error::Template` if a placeholder has no binding in `vars`, or
/// if a `{{$` opener is never closed with `}}`.
pub fn render(template: &str, vars: &HashMap<&str, String>) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{$") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 3..];
        let end = after_open.find("}}").ok_or_else(|| {
            Error::Template("unterminated placeholder (missing `}}`)".to_string())
        })?;
        let name = after_open[..end].trim();
        let value = vars
            .get(name)
            .ok_or_else(|| Error::Template(format!("no value bound for placeholder `{name}`")))?;
        out.push_str(value);
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn substitutes_placeholders() {
        let rendered = render(
            "Hello {{$name}}, you are {{$mood}}.",
            &vars(&[("name", "Aino"), ("mood", "curious")]),
        )
        .unwrap();
        assert_eq!(rendered, "Hello Aino, you are curious.");
    }

    #[test]
    fn placeholder_name_is_trimmed() {
        let rendered = render("{{$ name }}", &vars(&[("name", "x")])).unwrap();
        assert_eq!(rendered, "x");
    }

    #[test]
    fn repeated_placeholder_substitutes_each_occurrence() {
        let rendered = render("{{$a}} and {{$a}}", &vars(&[("a", "again")])).unwrap();
        assert_eq!(rendered, "again and again");
    }

    #[test]
    fn text_without_placeholders_passes_through() {
        let rendered = render("plain text, no markers", &HashMap::new()).unwrap();
        assert_eq!(rendered, "plain text, no markers");
    }

    #[test]
    fn unbound_placeholder_is_an_error() {
        let result = render("{{$missing}}", &HashMap::new());
        match result {
            Err(Error::Template(msg)) => assert!(msg.contains("missing")),
            other => panic!("expected template error, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let result = render("start {{$broken", &vars(&[("broken", "x")]));
        assert!(matches!(result, Err(Error::Template(_))));
    }

    #[test]
    fn grounded_template_renders_with_context_and_question() {
        let rendered = render(
            GROUNDED_ANSWER_TEMPLATE,
            &vars(&[("context", "- water boils at 100C"), ("question", "boiling point?")]),
        )
        .unwrap();
        assert!(rendered.contains("- water boils at 100C"));
        assert!(rendered.contains("Question: boiling point?"));
    }
}
