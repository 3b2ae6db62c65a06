use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static YEAR_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)_([0-9]{4})$").unwrap());

/// French ratio labels as printed on the finance table, with their export label.
static LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Autonomie financière (%)", "Financial Autonomy (%)"),
        ("BFR (j de CA)", "Working Capital Requirement (Days of Revenue)"),
        ("BFR (€)", "Working Capital Requirement (€)"),
        ("BFR exploitation (j de CA)", "Operating WCR (Days of Revenue)"),
        ("BFR exploitation (€)", "Operating WCR (€)"),
        ("BFR hors exploitation (j de CA)", "Non-Operating WCR (Days of Revenue)"),
        ("BFR hors exploitation (€)", "Non-Operating WCR (€)"),
        ("Capacité d'autofinancement (€)", "Self-Financing Capacity (€)"),
        ("Capacité d'autofinancement / CA (%)", "Self-Financing / Revenue (%)"),
        ("Capacité de remboursement", "Repayment Capacity"),
        ("Chiffre d'affaires (€)", "Revenue (€)"),
        ("Chiffre d'affaires à l'export (€)", "Export Revenue (€)"),
        ("Couverture des dettes", "Debt Coverage"),
        ("Couverture du BFR", "WCR Coverage"),
        ("Dettes financières (€)", "Financial Debt (€)"),
        ("Délai de paiement clients (j)", "Customer Payment Delay (Days)"),
        ("Délai de paiement fournisseurs (j)", "Supplier Payment Delay (Days)"),
        ("EBITDA - EBE (€)", "EBITDA (€)"),
        ("Fonds de roulement net global (€)", "Net Working Capital (€)"),
        ("Fonds propres (€)", "Equity (€)"),
        ("Impôts et taxes (€)", "Taxes (€)"),
        ("Liquidité générale", "General Liquidity"),
        ("Marge brute (€)", "Gross Margin (€)"),
        ("Marge nette (%)", "Net Margin (%)"),
        ("Ratio d'endettement (Gearing)", "Gearing Ratio"),
        ("Ratio des stocks / CA (j)", "Inventory / Revenue Ratio (Days)"),
        ("Rentabilité sur fonds propres (%)", "Return on Equity (%)"),
        ("Rentabilité économique (%)", "Return on Assets (%)"),
        ("Résultat d'exploitation (€)", "Operating Income (€)"),
        ("Résultat net (€)", "Net Income (€)"),
        ("Salaires / CA (%)", "Wages / Revenue (%)"),
        ("Salaires et charges sociales (€)", "Wages and Social Charges (€)"),
        ("Taux de croissance du CA (%)", "Revenue Growth Rate (%)"),
        ("Taux de levier (DFN/EBITDA)", "Leverage Ratio (Net Debt/EBITDA)"),
        ("Taux de marge brute (%)", "Gross Margin (%)"),
        ("Taux de marge d'EBITDA (%)", "EBITDA Margin (%)"),
        ("Taux de marge opérationnelle (%)", "Operating Margin (%)"),
        ("Trésorerie (€)", "Cash (€)"),
        ("Valeur ajoutée (€)", "Value Added (€)"),
        ("Valeur ajoutée / CA (%)", "Value Added / Revenue (%)"),
        ("État des dettes à 1 an au plus (€)", "Short-Term Debt (€)"),
    ])
});

/// Turns a `<label>_<year>` column into the display form `"<English label> - <year>"`.
/// Columns without a year suffix are already display names and pass through.
pub fn translate(column: &str) -> String {
    match YEAR_SUFFIX.captures(column) {
        Some(caps) => {
            let label = caps[1].trim();
            let translated = LABELS.get(label).copied().unwrap_or(label);
            format!("{} - {}", translated.trim(), &caps[2])
        }
        None => column.to_string(),
    }
}
