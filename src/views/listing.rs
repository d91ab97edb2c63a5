//! HTML rendering of a directory listing.
//!
//! A pure function of the listing: the same entries always produce the same
//! document, in the same order.

use crate::{
    models::entry::{DirectoryEntry, Icon},
    services::resolver::DirectoryListing,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; font-size: 13px; color: #333; }
        .icon { width: 16px; height: 16px; vertical-align: middle; margin-right: 5px; }
        h1 { font-size: 15px; margin: 0 0 12px 0; padding-bottom: 5px; border-bottom: 1px solid #eee; }
        table { border-collapse: collapse; width: 100%; line-height: 1.4; }
        th { text-align: left; padding: 4px 8px; background-color: #f8f9fa; border-bottom: 2px solid #ddd; font-weight: 500; }
        td { padding: 3px 8px; border-bottom: 1px solid #eee; }
        .folder { font-weight: 500; }
        a { text-decoration: none; color: #0366d6; }
        a:hover { text-decoration: underline; }
"#;

const DIR_ICON: &str = r#"<img src="data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAABcAAAAWCAYAAAArdgcFAAAAAXNSR0IArs4c6QAAAARnQU1BAACxjwv8YQUAAAAJcEhZcwAADsMAAA7DAcdvqGQAAAH/SURBVEhLxdPfS1phHAZw7/XCP0JBlsIkNhgULAYjUjkzByuDEAx2ZlQWZm4VhZbWoagoibGti7WwGGUUjo3KflLjELHdrLGiHxeDXQi7iA0p4qn37WRl54BIhx54vHrfj3zf9z0KyJgUHggE4HA4JMuyLJLJpLA6s1A8FAohVFsGrsYm2Y7qp2jwepBIJOjGTKLgOA4+J4O96SCw/lqyydUwmpxF6Gj3g+xJbzQaFciLKE6DmR4n/i/3iqLnPeYH8Svigbu0AA7zg2utZ+2IxWICexaKD9U9xs+ROuxPNEp2d/wVPrcX499Sj+ifz4WrYH54D/F4XKAFfHuyDQvddkw0Fkp2qsWMo69hUZhM/e2dCy+td6DVasHz/FVcbFOmJcf1viYPfnsu9Ho9QW8OJ/exPeaVB9/8UIu3L+7Lgx+uDeDHsFsefOejDxFPgTz4wUI3+MEKefDfUy2YbrXIgye+BDHfVXqLOBnv72wnXfwn5qdnuR9toq9ha7SevmdyeeSLvLx24w0rfiwmkwkjwefYjPgw2VyElb5yzHHP8CnwhF7SmPdR6h0TeNidj+9DldfWLvZXoJJJw8mP1WqFy5SD1pK7aCvLzaquU9hoNEKj0UCpVF7gJDabDTqdDgaDIesSWK1Ww2KxUDOFk5AJyEjZVqVSgWEYQUvDbzbACZHvxmyDCBW5AAAAAElFTkSuQmCC" class="icon" alt="[DIR]">"#;

const FILE_ICON: &str = r#"<img src="data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAABYAAAAbCAYAAAB4Kn/lAAAAAXNSR0IArs4c6QAAAARnQU1BAACxjwv8YQUAAAAJcEhZcwAADsMAAA7DAcdvqGQAAAIVSURBVEhLtZW/y3FhGMctJilFKZKB8gdYMCmbxUBRJpOYlSxYjQx+LMrERIQQFkQiGaRYlB+hZLKQrqfrzvHynuc8jsf7fusznHPd96f7nHNf9+HAfwoRq9XqX9FsNonku9zFrVYLZrMZK4xGIxSLRQgGg1Cr1Yjo79zFy+WS3GATk8kE4/EYJpMJhMNhqFQqt8qffCTGDAYDSCQSUK1WyTWVj8WYXq8H8Xj86Z3TxO12GzKZDA18p1T0ej3EYjHIZrNQKBQgn8+Dz+cDm80G9XqdjKGJvV4vaDQaGmazmdQxCoUC5HI58Pl8EIvFIBKJQCAQgFQqBZ1OR8bQxIfDAdbrNY3dbkfqGK1WCxKJBIRCIRFS8Hg8ZrHFYgEul0tDpVKROuZyucD5fIZSqQTRaPSO0+lkFm82G5jP5zQWiwWpP+Z0OkGj0SC7AnG5XMziQCAABoOBFdhUx+MRVqsVdDqdn8W4gmQyyYrHp8Bm+VGcTqfJqtkwnU7JHMxLcSQSAYfDwYrhcEjmYF6KsaNwk7Nhv9+TOZiXYrfbDUqlkhWP58NL8WOu1yvZr0xgncpb4lQqRTqMiXK5fBv5pni73UK322UE25/KW2L8O1itVkb6/f5t5Jvi0WgEoVCIEfxNUXlL/E4YxblcjqwA2/Q34IfEM/tJjCc/4vF4wO/3/wq73Q4ymexZTAVvcjicj/hW/O8C8AXGNRjtT4rvuAAAAABJRU5ErkJggg==" class="icon" alt="[FILE]">"#;

/// Render `listing` as a complete HTML page.
pub fn render_listing(listing: &DirectoryListing) -> String {
    let title = html_escape(&listing.path);

    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str(&format!("    <title>Index of {}</title>\n", title));
    html.push_str(&format!("    <style>{}    </style>\n", STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("    <h1>Index of {}</h1>\n", title));
    html.push_str("    <table>\n");
    html.push_str("        <tr><th>Name</th><th>Size</th><th>Last Modified</th></tr>\n");
    for entry in &listing.entries {
        html.push_str(&render_row(entry));
    }
    html.push_str("    </table>\n</body>\n</html>\n");
    html
}

fn render_row(entry: &DirectoryEntry) -> String {
    let icon = match entry.icon {
        Icon::Directory => DIR_ICON,
        Icon::File => FILE_ICON,
    };
    let class = if entry.is_dir { " class=\"folder\"" } else { "" };
    let suffix = if entry.is_dir { "/" } else { "" };
    let modified = entry
        .modified
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        concat!(
            "        <tr>\n",
            "            <td>{} <a href=\"{}\"{}>{}{}</a></td>\n",
            "            <td>{}</td>\n",
            "            <td>{}</td>\n",
            "        </tr>\n"
        ),
        icon,
        html_escape(&encode_href(&entry.url)),
        class,
        html_escape(&entry.name),
        suffix,
        html_escape(&entry.size),
        modified,
    )
}

/// Percent-encode each path segment, keeping the separators.
fn encode_href(url: &str) -> String {
    url.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
