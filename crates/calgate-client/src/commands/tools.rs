//! Tool listing.

use calgate_protocol::ToolDescriptor;
use calgate_server::descriptors;

use crate::error::ClientResult;

/// Print the exposed tools.
pub fn list(json: bool) -> ClientResult<()> {
    let tools = descriptors();
    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
    } else {
        print!("{}", render(&tools));
    }
    Ok(())
}

/// One line per tool: name, then description.
fn render(tools: &[ToolDescriptor]) -> String {
    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    tools
        .iter()
        .map(|t| format!("{:width$}  {}\n", t.name, t.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_aligns_names() {
        let rendered = render(&descriptors());
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("get_upcoming_events"));

        let tools = descriptors();
        let width = tools.iter().map(|t| t.name.len()).max().unwrap();
        for (line, tool) in lines.iter().zip(&tools) {
            assert_eq!(line[..width].trim_end(), tool.name);
            assert_eq!(&line[width + 2..], tool.description);
        }
    }

    #[test]
    fn render_empty() {
        assert_eq!(render(&[]), "");
    }
}
