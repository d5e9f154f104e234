// HTML document shell and value formatting shared by every report
use chrono::Local;

/// Shown wherever an optional value is absent
pub const PLACEHOLDER: &str = "Not specified";

const STYLE: &str = r#"
        body {
            font-family: Arial, sans-serif;
            margin: 40px;
            line-height: 1.6;
        }
        h1 {
            color: #2c3e50;
            border-bottom: 3px solid #3498db;
            padding-bottom: 10px;
        }
        h2 {
            color: #34495e;
            margin-top: 30px;
        }
        table {
            width: 100%;
            border-collapse: collapse;
            margin: 20px 0;
        }
        th {
            background-color: #3498db;
            color: white;
            padding: 12px;
            text-align: left;
        }
        td {
            padding: 10px;
            border-bottom: 1px solid #ddd;
        }
        .info-section {
            margin: 20px 0;
            padding: 15px;
            background-color: #f8f9fa;
            border-left: 4px solid #3498db;
        }
        .label {
            font-weight: bold;
            color: #2c3e50;
        }
        .photo {
            margin: 20px 0;
            text-align: center;
            page-break-inside: avoid;
        }
        .photo img {
            max-width: 100%;
            height: auto;
            border: 1px solid #ddd;
            padding: 5px;
        }
        .caption {
            font-size: 0.9em;
            color: #666;
        }
        .footer {
            margin-top: 50px;
            padding-top: 20px;
            border-top: 2px solid #ddd;
            text-align: center;
            color: #7f8c8d;
        }
        @media print {
            body { margin: 20px; }
        }
"#;

/// Wrap a report body in a complete, printable document
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n    <style>{style}    </style>\n</head>\n<body>\n{body}\n{footer}</body>\n</html>\n",
        title = escape(title),
        style = STYLE,
        body = body,
        footer = footer(),
    )
}

fn footer() -> String {
    let printed = Local::now().format("%Y-%m-%d %H:%M");
    format!(
        "    <div class=\"footer\">\n        <p>Hembygdsmuseum - Printed {}</p>\n    </div>\n",
        printed
    )
}

pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape for use inside a double-quoted attribute value
pub fn escape_attribute(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Escaped value, or the placeholder when absent or blank
pub fn text_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => escape(text),
        _ => PLACEHOLDER.to_string(),
    }
}

/// "L × W × H cm" from whichever dimensions are present
pub fn format_dimensions(length: Option<f64>, width: Option<f64>, height: Option<f64>) -> String {
    let parts: Vec<String> = [length, width, height]
        .into_iter()
        .flatten()
        .map(format_number)
        .collect();

    if parts.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        format!("{} cm", parts.join(" × "))
    }
}

pub fn format_weight(weight_g: Option<f64>) -> String {
    match weight_g {
        Some(weight) => format!("{} g", format_number(weight)),
        None => PLACEHOLDER.to_string(),
    }
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// `<p><span class="label">Label:</span> value</p>`; `value` must already be escaped
pub fn labelled(label: &str, value: &str) -> String {
    format!(
        "    <p><span class=\"label\">{}:</span> {}</p>\n",
        escape(label),
        value
    )
}

/// A table with a header row; cells must already be escaped
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table>\n    <thead>\n        <tr>\n");
    for header in headers {
        html.push_str(&format!("            <th>{}</th>\n", escape(header)));
    }
    html.push_str("        </tr>\n    </thead>\n    <tbody>\n");
    for row in rows {
        html.push_str("        <tr>\n");
        for cell in row {
            html.push_str(&format!("            <td>{}</td>\n", cell));
        }
        html.push_str("        </tr>\n");
    }
    html.push_str("    </tbody>\n</table>\n");
    html
}
