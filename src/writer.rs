/// Line-oriented writer used to serialize document nodes.
///
/// Nodes append their start tag with [`WriteInfo::add_node_starter`], let
/// their children write at [`WriteInfo::incremental_indent`], and close with
/// [`WriteInfo::add_node_ender`]. The writer remembers the indent of every
/// open node so enders line up with their starters.
#[derive(Debug, Clone)]
pub struct WriteInfo {
    /// Accumulated output lines.
    pub lines: Vec<String>,
    incremental_indent: String,
    values_per_line: usize,
    open_nodes: Vec<String>,
}

impl Default for WriteInfo {
    fn default() -> Self {
        WriteInfo::new("  ", 100)
    }
}

impl WriteInfo {
    pub fn new(incremental_indent: &str, values_per_line: usize) -> Self {
        WriteInfo {
            lines: Vec::new(),
            incremental_indent: incremental_indent.to_string(),
            values_per_line: values_per_line.max(1),
            open_nodes: Vec::new(),
        }
    }

    pub fn incremental_indent(&self, indent: &str) -> String {
        format!("{}{}", indent, self.incremental_indent)
    }

    /// Format one ` name="value"` attribute.
    pub fn add_attribute(name: &str, value: &str) -> String {
        format!(" {}=\"{}\"", name, escape(value))
    }

    pub fn add_node_starter(&mut self, indent: &str, moniker: &str, attributes: &str) {
        self.lines.push(format!("{}<{}{}>", indent, moniker, attributes));
        self.open_nodes.push(indent.to_string());
    }

    /// Write a node that has attributes only.
    pub fn add_node_starter_ender(&mut self, indent: &str, moniker: &str, attributes: &str) {
        self.lines.push(format!("{}<{}{}/>", indent, moniker, attributes));
    }

    pub fn add_node_ender(&mut self, moniker: &str) {
        let indent = self.open_nodes.pop().unwrap_or_default();
        self.lines.push(format!("{}</{}>", indent, moniker));
    }

    /// Write numeric values, `values_per_line` per line.
    pub fn add_values(&mut self, indent: &str, values: &[f64]) {
        for chunk in values.chunks(self.values_per_line) {
            let text: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
            self.lines.push(format!("{}{}", indent, text.join(" ")));
        }
    }

    pub fn to_xml(&self) -> String {
        self.lines.join("\n")
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_nodes() {
        let mut write_info = WriteInfo::default();
        let attributes = WriteInfo::add_attribute("label", "a & b");
        write_info.add_node_starter("", "outer", &attributes);
        let indent2 = write_info.incremental_indent("");
        write_info.add_node_starter_ender(&indent2, "inner", "");
        write_info.add_values(&indent2, &[1.0, 2.5]);
        write_info.add_node_ender("outer");
        assert_eq!(
            write_info.to_xml(),
            "<outer label=\"a &amp; b\">\n  <inner/>\n  1 2.5\n</outer>"
        );
    }

    #[test]
    fn test_values_wrap() {
        let mut write_info = WriteInfo::new(" ", 2);
        write_info.add_values("", &[1.0, 2.0, 3.0]);
        assert_eq!(write_info.lines, vec!["1 2".to_string(), "3".to_string()]);
    }
}
