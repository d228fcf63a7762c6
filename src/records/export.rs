use super::purchase::PurchaseRecord;

const CSV_HEADER: &str =
    "Company,Buyer,Purchase Date,Fish,Size (kg),Quantity,Price Per Unit,Total Price,Payment Status";

/// Renders a record list as delimited text, one line per purchase.
///
/// Emits rows in the order given, so callers pass a pre-sorted or
/// pre-grouped slice when ordering matters. Fields containing a comma,
/// quote, or newline are quoted with doubled inner quotes.
pub fn records_to_csv(records: &[PurchaseRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        let fields = [
            csv_field(&record.company_name),
            csv_field(&record.buyer_name),
            record.purchase_date.format("%Y-%m-%d").to_string(),
            csv_field(&record.fish_name),
            format_amount(record.size_kg),
            format_amount(record.quantity),
            format_amount(record.price_per_unit),
            format_amount(record.total_price),
            record.payment_status.as_str().to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
