//! CSV export of the inventory.
//!
//! Columns: `ID, Provider, Category, Status, IPs, Global Domains`.
//! Addresses are joined with `", "`, so the IPs field (and any free-text
//! field carrying commas or newlines) is RFC 4180 quoted.

use chrono::NaiveDate;

use rackwatch_store::ServerRecord;

const HEADERS: [&str; 6] = ["ID", "Provider", "Category", "Status", "IPs", "Global Domains"];

/// `servers_export_<ISO-date>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("servers_export_{date}.csv")
}

/// Render the full inventory as CSV.
pub fn render_csv(records: &[ServerRecord]) -> String {
    let mut out = String::new();
    out.push_str(&HEADERS.join(","));
    out.push('\n');
    for record in records {
        let ips = record
            .ip_data
            .iter()
            .map(|e| e.address.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let row = [
            record.id.as_str(),
            record.provider.as_str(),
            record.category.label(),
            record.status.label(),
            ips.as_str(),
            record.global_domains.as_str(),
        ];
        let line = row.map(escape_field).join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rackwatch_store::{Category, IpEntry, ServerStatus};

    fn record(id: &str, addresses: &[&str]) -> ServerRecord {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ServerRecord {
            id: id.to_string(),
            provider: "Hetzner".to_string(),
            category: Category::LowDelivery,
            status: ServerStatus::TimedOut,
            ip_data: addresses
                .iter()
                .enumerate()
                .map(|(i, a)| IpEntry {
                    id: format!("ip_{i}"),
                    address: a.to_string(),
                    use_global: true,
                    custom_domains: String::new(),
                })
                .collect(),
            global_domains: String::new(),
            created_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn header_row() {
        let csv = render_csv(&[]);
        assert_eq!(csv, "ID,Provider,Category,Status,IPs,Global Domains\n");
    }

    #[test]
    fn single_ip_row_is_unquoted() {
        let csv = render_csv(&[record("srv-1", &["192.0.2.1"])]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "srv-1,Hetzner,Low Delivery,Timed Out,192.0.2.1,");
    }

    #[test]
    fn joined_ips_are_quoted() {
        let csv = render_csv(&[record("srv-1", &["192.0.2.1", "192.0.2.2"])]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with("\"192.0.2.1, 192.0.2.2\","));
    }

    #[test]
    fn quotes_inside_fields_are_doubled() {
        let mut rec = record("srv-1", &[]);
        rec.provider = "He said \"fast\"".to_string();
        let csv = render_csv(&[rec]);
        assert!(csv.contains("\"He said \"\"fast\"\"\""));
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "servers_export_2024-03-09.csv");
    }
}
