//! JSON item input and output.

use std::io::Write;

use anyhow::Context;
use pipeline::{InputItem, OutputItem};
use serde_json::Value;

/// Parses input items.
///
/// Accepts a single JSON array (one item per element), or any sequence of
/// whitespace-separated JSON values such as JSON Lines (one item per value).
/// Blank input yields no items.
pub fn parse_items(text: &str) -> anyhow::Result<Vec<InputItem>> {
    let values = serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
        .context("input is not valid JSON")?;

    let items = match <[Value; 1]>::try_from(values) {
        Ok([Value::Array(elements)]) => elements,
        Ok([single]) => vec![single],
        Err(values) => values,
    };

    Ok(items.into_iter().map(InputItem::new).collect())
}

/// Writes the output items as one JSON array followed by a newline.
pub fn write_items(mut out: impl Write, items: &[OutputItem], pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, items)?;
    } else {
        serde_json::to_writer(&mut out, items)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::ItemIndex;
    use serde_json::json;

    #[test]
    fn test_array_input_yields_one_item_per_element() {
        let items = parse_items(r#"[{"email":"a@example.com"},{"email":"b@example.com"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].json["email"], "b@example.com");
    }

    #[test]
    fn test_single_object_input() {
        let items = parse_items(r#"{"email":"a@example.com"}"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_json_lines_input() {
        let text = "{\"email\":\"a@example.com\"}\n{\"email\":\"b@example.com\"}\n\n{\"email\":\"c@example.com\"}\n";
        let items = parse_items(text).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].json["email"], "c@example.com");
    }

    #[test]
    fn test_blank_input_yields_no_items() {
        assert!(parse_items("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(parse_items("{\"email\": ").is_err());
    }

    #[test]
    fn test_write_items_emits_array() {
        let input = InputItem::new(json!({"email": "a@example.com"}));
        let output = OutputItem::with_result(ItemIndex::new(0), &input, json!({"result": "risky"}));

        let mut buf = Vec::new();
        write_items(&mut buf, &[output], false).unwrap();

        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["json"]["bounceban_result"]["result"], "risky");
        assert_eq!(parsed[0]["pairedItem"]["item"], 0);
    }
}
