use crate::models::customer::Customer;
use chrono::{DateTime, SecondsFormat, Utc};

const CSV_HEADERS: [&str; 16] = [
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Company",
    "Address",
    "City",
    "State",
    "Country",
    "Zip Code",
    "Status",
    "Shopify Customer ID",
    "Notes",
    "Created At",
    "Approved At",
    "Rejected At",
];

pub struct ExportService;

impl ExportService {
    /// Render customers as CSV. Every cell is quoted and embedded quotes are
    /// doubled, so commas, quotes and newlines in the data survive a parse.
    pub fn generate_customers_csv(customers: &[Customer]) -> String {
        let mut out = String::new();
        out.push_str(&CSV_HEADERS.join(","));
        out.push('\n');

        for customer in customers {
            let fields = [
                customer.first_name.clone(),
                customer.last_name.clone(),
                customer.email.clone(),
                customer.phone.clone().unwrap_or_default(),
                customer.company.clone().unwrap_or_default(),
                customer.address.clone().unwrap_or_default(),
                customer.city.clone().unwrap_or_default(),
                customer.state.clone().unwrap_or_default(),
                customer.country.clone().unwrap_or_default(),
                customer.zip_code.clone().unwrap_or_default(),
                customer.status.to_string(),
                customer.shopify_customer_id.clone().unwrap_or_default(),
                customer.notes.clone().unwrap_or_default(),
                format_timestamp(Some(customer.created_at)),
                format_timestamp(customer.approved_at),
                format_timestamp(customer.rejected_at),
            ];
            let row: Vec<String> = fields.iter().map(|cell| quote_cell(cell)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn quote_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
