//! Technology catalogue used to detect a project's stack from its prose.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Detected technologies grouped by catalogue category.
pub type TechStack = BTreeMap<String, Vec<String>>;

const CATALOGUE: &[(&str, &[&str])] = &[
    (
        "Frontend",
        &["React", "React.js", "Vue", "Vue.js", "Angular", "Next.js", "Nuxt", "Tailwind", "Bootstrap", "Redux"],
    ),
    (
        "Backend",
        &["Node.js", "Node", "Express", "Python", "Django", "Flask", "PHP", "Laravel", "Java", "Spring"],
    ),
    ("Database", &["MongoDB", "PostgreSQL", "MySQL", "Redis", "Firebase", "Supabase"]),
    (
        "Infrastructure",
        &["AWS", "Docker", "Kubernetes", "Azure", "GCP", "Nginx", "CI/CD"],
    ),
    (
        "CMS/Ecom",
        &["Shopify", "WordPress", "Magento", "WooCommerce", "BigCommerce", "Liquid"],
    ),
    ("API", &["GraphQL", "REST", "Stripe", "PayPal", "Google Maps API", "Twilio"]),
];

struct CatalogueEntry {
    category: &'static str,
    term: &'static str,
    pattern: Regex,
}

/// Whole-word, case-insensitive matchers so "Go" never matches "Google".
static MATCHERS: Lazy<Vec<CatalogueEntry>> = Lazy::new(|| {
    CATALOGUE
        .iter()
        .flat_map(|(category, terms)| terms.iter().map(move |term| (*category, *term)))
        .filter_map(|(category, term)| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
                .ok()
                .map(|pattern| CatalogueEntry {
                    category,
                    term,
                    pattern,
                })
        })
        .collect()
});

/// Scans text for catalogue technologies.
pub fn detect_tech_stack(text: &str) -> TechStack {
    let mut found = TechStack::new();
    for entry in MATCHERS.iter() {
        if entry.pattern.is_match(text) {
            found
                .entry(entry.category.to_string())
                .or_default()
                .push(entry.term.to_string());
        }
    }
    found
}

/// Flattens a stack into a de-duplicated list, preserving first occurrence.
pub fn flatten_tech_stack(stack: &TechStack) -> Vec<String> {
    let mut flat: Vec<String> = Vec::new();
    for term in stack.values().flatten() {
        if !flat.iter().any(|t| t == term) {
            flat.push(term.clone());
        }
    }
    flat
}
