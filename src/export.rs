//! Rendering of a visible product set for the `search` command.
//!
//! - JSON - structured data for programmatic use
//! - Markdown - a table with one row per product
//! - Plain Text - simple, copy-paste friendly listing

use clap::ValueEnum;

use crate::model::types::Product;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// Plain text listing
    #[default]
    Plain,
    /// JSON document with query metadata and products
    Json,
    /// Markdown table
    Markdown,
}

/// Options for export customization
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Query text (for header/metadata)
    pub query: Option<String>,
    /// Active price ceiling (for header/metadata)
    pub max_price: Option<f64>,
    /// Include product descriptions
    pub include_description: bool,
    /// Include thumbnail URIs
    pub include_thumbnail: bool,
    /// Maximum description length (0 = unlimited)
    pub max_description_len: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            query: None,
            max_price: None,
            include_description: true,
            include_thumbnail: true,
            max_description_len: 200,
        }
    }
}

/// Export products to the specified format
pub fn export_products(
    products: &[&Product],
    format: ExportFormat,
    options: &ExportOptions,
) -> String {
    match format {
        ExportFormat::Plain => export_plain_text(products, options),
        ExportFormat::Json => export_json(products, options),
        ExportFormat::Markdown => export_markdown(products, options),
    }
}

/// Escape special Markdown characters to prevent formatting issues or injection.
fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('*', "\\*")
        .replace('_', "\\_")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('<', "\\<")
        .replace('>', "\\>")
        .replace('`', "\\`")
}

fn export_markdown(products: &[&Product], options: &ExportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Products\n\n");

    if let Some(query) = options.query.as_deref().filter(|q| !q.trim().is_empty()) {
        output.push_str(&format!("**Query:** `{}`\n\n", query.replace('`', "")));
    }
    if let Some(max_price) = options.max_price {
        output.push_str(&format!("**Max price:** {}\n\n", format_price(max_price)));
    }
    output.push_str(&format!("**Results:** {}\n\n", products.len()));

    if products.is_empty() {
        return output;
    }

    let mut header = String::from("| ID | Title | Price |");
    let mut rule = String::from("|----|-------|-------|");
    if options.include_description {
        header.push_str(" Description |");
        rule.push_str("-------------|");
    }
    if options.include_thumbnail {
        header.push_str(" Thumbnail |");
        rule.push_str("-----------|");
    }
    output.push_str(&header);
    output.push('\n');
    output.push_str(&rule);
    output.push('\n');

    for product in products {
        output.push_str(&format!(
            "| {} | {} | {} |",
            escape_markdown(product.id.as_str()),
            escape_markdown(&product.title),
            format_price(product.price)
        ));
        if options.include_description {
            let description = truncate_text(&product.description, options.max_description_len);
            output.push_str(&format!(
                " {} |",
                escape_markdown(&description.replace('\n', " "))
            ));
        }
        if options.include_thumbnail {
            output.push_str(&format!(" {} |", product.thumbnail.replace('|', "%7C")));
        }
        output.push('\n');
    }

    output
}

fn export_json(products: &[&Product], options: &ExportOptions) -> String {
    let export_data = serde_json::json!({
        "query": options.query,
        "max_price": options.max_price,
        "count": products.len(),
        "products": products.iter().map(|product| {
            let mut obj = serde_json::json!({
                "id": product.id,
                "title": product.title,
                "price": product.price,
            });

            if options.include_description {
                obj["description"] =
                    serde_json::json!(truncate_text(&product.description, options.max_description_len));
            }

            if options.include_thumbnail {
                obj["thumbnail"] = serde_json::json!(product.thumbnail);
            }

            obj
        }).collect::<Vec<_>>()
    });

    serde_json::to_string_pretty(&export_data).unwrap_or_else(|_| "{}".to_string())
}

fn export_plain_text(products: &[&Product], options: &ExportOptions) -> String {
    let mut output = String::new();

    if let Some(query) = options.query.as_deref().filter(|q| !q.trim().is_empty()) {
        output.push_str(&format!("Query: {query}\n"));
    }
    if let Some(max_price) = options.max_price {
        output.push_str(&format!("Max price: {}\n", format_price(max_price)));
    }
    output.push_str(&format!("Results: {}\n", products.len()));
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for (i, product) in products.iter().enumerate() {
        output.push_str(&format!(
            "[{}] {} (#{})\n",
            i + 1,
            product.title,
            product.id
        ));
        output.push_str(&format!("Price: {}\n", format_price(product.price)));

        if options.include_description && !product.description.is_empty() {
            let description = truncate_text(&product.description, options.max_description_len);
            for line in description.lines() {
                output.push_str(&format!("  {line}\n"));
            }
        }

        if options.include_thumbnail && !product.thumbnail.is_empty() {
            output.push_str(&format!("Thumbnail: {}\n", product.thumbnail));
        }

        output.push('\n');
    }

    output
}

/// Prices render with a dollar sign, without trailing zeros for whole amounts.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("${price:.0}")
    } else {
        format!("${price:.2}")
    }
}

/// Truncate text to max length (in characters), adding ellipsis if needed
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return text.to_string();
    }

    let char_count = text.chars().count();
    if char_count <= max_len {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
