use crate::Result;
use crate::model::Treemap;

/// Render the treemap as JSON text terminated by a single newline.
///
/// `pretty` selects 2-space indentation; otherwise the document is one line.
/// Key order follows the node struct field order and absent optional field
/// attributes are left out rather than written as `null`.
pub fn render_treemap_json(tree: &Treemap, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_treemap;
    use crate::record::{TopicRecord, ViewRecord, parse_topic, parse_view};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn sample() -> (Vec<TopicRecord>, Vec<ViewRecord>) {
        let topics = vec![
            parse_topic(
                "orders",
                "base_view: orders_view\nlabel: \"Orders\"\njoins:\n  customers_view:\n    addresses_view: {}\n",
            )
            .unwrap(),
            parse_topic("solo", "{}").unwrap(),
        ];
        let views = vec![
            parse_view(
                "orders_view",
                "schema: sales\ndimensions: {id: {primary_key: true}}\nmeasures: {total: {aggregate_type: sum}}\n",
            )
            .unwrap(),
            parse_view(
                "customers_view",
                "schema: crm\ndimensions:\n  name:\n    sql: '\"NAME\"'\n    label: Nom du client\n    format: ~\n    primary_key: false\n",
            )
            .unwrap(),
        ];
        (topics, views)
    }

    #[test]
    fn orders_topic_renders_exactly() {
        let (topics, views) = sample();
        let tree = build_treemap(&topics, &views);
        let node = serde_json::to_string(&tree.topics()[0]).unwrap();
        assert_eq!(
            node,
            r#"{"name":"orders","label":"Orders","base_view":"orders_view","children":[{"name":"orders_view","value":1,"ref_type":"base_view"},{"name":"customers_view","value":1,"ref_type":"join"},{"name":"addresses_view","value":1,"ref_type":"join"}]}"#
        );

        let join = serde_json::to_string(&tree.joins()[0]).unwrap();
        assert_eq!(
            join,
            r#"{"name":"orders","label":"Orders","children":[{"name":"customers_view","value":1,"ref_type":"join"},{"name":"addresses_view","value":1,"ref_type":"join"}]}"#
        );
    }

    #[test]
    fn optional_attributes_are_omitted_not_null() {
        let (topics, views) = sample();
        let tree = build_treemap(&topics, &views);
        let json: Value = serde_json::from_str(&render_treemap_json(&tree, true).unwrap()).unwrap();

        let views_branch = &json["children"][2];
        assert_eq!(views_branch["name"], "views");

        // schemas sort as crm, sales
        let name_field = &views_branch["children"][0]["children"][0]["children"][0]["children"][0];
        let keys: Vec<&str> = name_field
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["name", "value", "field_type", "sql", "label"]);

        let id_field = &views_branch["children"][1]["children"][0]["children"][0]["children"][0];
        assert_eq!(
            id_field,
            &serde_json::json!({
                "name": "id",
                "value": 1,
                "field_type": "dimension",
                "primary_key": true
            })
        );
        let total_field = &views_branch["children"][1]["children"][0]["children"][1]["children"][0];
        assert_eq!(total_field["aggregate_type"], "sum");
        assert_eq!(total_field["field_type"], "measure");
    }

    #[test]
    fn round_trip_is_lossless() {
        let (topics, views) = sample();
        let tree = build_treemap(&topics, &views);

        for pretty in [true, false] {
            let text = render_treemap_json(&tree, pretty).unwrap();
            let parsed: Treemap = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, tree);

            // Key order survives too.
            let reparsed: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(serde_json::to_string(&reparsed).unwrap(), serde_json::to_string(&tree).unwrap());
        }
    }

    #[test]
    fn branch_layout() {
        let text = render_treemap_json(&build_treemap(&[], &[]), false).unwrap();
        assert_eq!(
            text,
            "{\"name\":\"omni\",\"children\":[{\"name\":\"topics\",\"children\":[]},{\"name\":\"joins\",\"children\":[]},{\"name\":\"views\",\"children\":[]}]}\n"
        );
    }

    #[test]
    fn pretty_output_uses_two_spaces_and_one_trailing_newline() {
        let text = render_treemap_json(&build_treemap(&[], &[]), true).unwrap();
        assert!(text.starts_with("{\n  \"name\": \"omni\",\n  \"children\": ["));
        assert!(text.ends_with("}\n"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let topics = vec![parse_topic("ventes", "label: Ventes été\n").unwrap()];
        let text = render_treemap_json(&build_treemap(&topics, &[]), false).unwrap();
        assert!(text.contains("Ventes été"));
    }

    #[test]
    fn numbers_and_booleans_stay_typed() {
        let topics = vec![parse_topic("t", "label: 2024\n").unwrap()];
        let views = vec![
            parse_view("v", "dimensions: {year: {sql: 42, format: 1.5, label: true}}\n").unwrap(),
        ];
        let tree = build_treemap(&topics, &views);
        let text = render_treemap_json(&tree, false).unwrap();

        assert!(text.contains(r#"{"name":"t","label":2024,"#), "{}", text);
        assert!(
            text.contains(r#"{"name":"year","value":1,"field_type":"dimension","sql":42,"format":1.5,"label":true}"#),
            "{}",
            text
        );
        let parsed: Treemap = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, tree);
    }
}
