//! Vertical card display for clinic search results.

use clinicagg_core::Clinic;

/// Print matching clinics as cards, one per clinic.
pub fn print_clinic_cards(clinics: &[Clinic]) {
    print!("{}", render_cards(clinics));
}

fn render_cards(clinics: &[Clinic]) -> String {
    if clinics.is_empty() {
        return "no matching clinics\n".to_string();
    }

    let mut out = String::new();
    for clinic in clinics {
        let availability = clinic.availability();
        out.push_str(&format!("=== {} ===\n", clinic.name()));
        out.push_str(&format!("  {:<8} {}\n", "state", clinic.region()));
        out.push_str(&format!("  {:<8} {}\n", "from", or_dash(availability.from())));
        out.push_str(&format!("  {:<8} {}\n", "to", or_dash(availability.to())));
        out.push('\n');
    }
    out.push_str(&format!("{} clinic(s)\n", clinics.len()));
    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
