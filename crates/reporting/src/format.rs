//! Row layout and field escaping of the CSV reports.

use chrono::{DateTime, Utc};

use stockroom_inventory::{
    ForecastItem, ProductStock, StockAlert, StockLevels, StockStatus, classify, classify_levels,
};

/// Header of the alert report and of the full stock listing.
pub const ALERTS_HEADER: [&str; 9] = [
    "ID Produto",
    "Nome",
    "Marca",
    "Tipo",
    "Data Criacao",
    "Quantidade",
    "Minima",
    "Emergencial",
    "Status Texto",
];

/// Header of the purchase forecast report.
pub const FORECAST_HEADER: [&str; 6] = [
    "Produto",
    "Categoria",
    "Estoque Atual",
    "Estoque Minimo",
    "Quantidade Comprar",
    "Urgencia",
];

/// Trailing forecast column, present only when supplier text was supplied.
pub const FORECAST_SUPPLIERS_COLUMN: &str = "Fornecedores";

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escapes a text field.
///
/// Absent or empty text becomes `""`. Text containing a comma, a double quote
/// or a line break is wrapped in double quotes with inner quotes doubled.
/// Anything else is written as is.
pub fn escape_text(value: Option<&str>) -> String {
    match value {
        None | Some("") => "\"\"".to_string(),
        Some(s) if s.contains([',', '"', '\n', '\r']) => {
            format!("\"{}\"", s.replace('"', "\"\""))
        }
        Some(s) => s.to_string(),
    }
}

fn text(value: &str) -> String {
    escape_text(Some(value))
}

fn timestamp(at: DateTime<Utc>) -> String {
    text(&at.format(CREATED_AT_FORMAT).to_string())
}

pub(crate) fn header_row(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| text(c)).collect()
}

pub(crate) fn alert_row(alert: &StockAlert) -> Vec<String> {
    let status = classify_levels(StockLevels::new(alert.quantity, alert.minimum, alert.emergency));
    vec![
        alert.product_id.to_string(),
        text(&alert.product_name),
        escape_text(alert.brand.as_deref()),
        text(&alert.category),
        timestamp(alert.product_created_at),
        alert.quantity.to_string(),
        alert.minimum.to_string(),
        alert.emergency.to_string(),
        text(status.label()),
    ]
}

/// Listing row; a product without a stock record shows zeros.
pub(crate) fn stock_row(item: &ProductStock) -> Vec<String> {
    let product = &item.product;
    let (levels, status) = match &item.stock {
        Some(stock) => (stock.levels(), classify(stock)),
        None => (StockLevels::new(0, 0, 0), StockStatus::for_missing_record()),
    };
    vec![
        product.product_id().to_string(),
        text(product.name()),
        escape_text(product.brand()),
        text(product.category()),
        timestamp(product.created_at()),
        levels.quantity.to_string(),
        levels.minimum.to_string(),
        levels.emergency.to_string(),
        text(status.label()),
    ]
}

pub(crate) fn forecast_row(item: &ForecastItem, with_suppliers: bool) -> Vec<String> {
    let mut row = vec![
        text(&item.product_name),
        text(&item.category),
        item.current_stock.to_string(),
        item.minimum_stock.to_string(),
        item.quantity_to_buy.to_string(),
        text(item.urgency.label()),
    ];
    if with_suppliers {
        row.push(escape_text(item.suppliers.as_deref()));
    }
    row
}
