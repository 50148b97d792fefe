//! Static rule matching: exact middleware names first, then `prefix*`
//! patterns in declared order with `{placeholder}` substitution.

use crate::config::{PatternRule, RuleTables};
use crate::route::{MiddlewareRef, OpaqueHandler};
use crate::rule::{Prerequisite, Rule, rule_type};
use std::collections::BTreeMap;

/// Resolve one middleware name against the static tables.
///
/// Overlapping patterns are order-dependent: the first declared pattern whose
/// prefix matches wins, even when a later pattern is more specific.
pub fn resolve(
    middleware_name: &str,
    exact_rules: &BTreeMap<String, Rule>,
    pattern_rules: &[PatternRule],
) -> Option<Rule> {
    if let Some(rule) = exact_rules.get(middleware_name) {
        return Some(rule.clone());
    }

    pattern_rules.iter().find_map(|pattern| {
        let prefix = pattern.prefix()?;
        let placeholder = middleware_name.strip_prefix(prefix)?;
        Some(pattern.rule.substitute(placeholder))
    })
}

/// Generic rule for middleware attached as a value rather than by name.
pub fn classify_opaque(handler: &OpaqueHandler) -> Prerequisite {
    match handler {
        OpaqueHandler::Closure => Rule::new(
            rule_type::CLOSURE_MIDDLEWARE,
            "Custom closure middleware",
            "Ensure closure middleware requirements are met",
            "Manually verify closure middleware behavior",
        )
        .into(),
        OpaqueHandler::Object { class } => Prerequisite::from(Rule::new(
            rule_type::OBJECT_MIDDLEWARE,
            format!("Object middleware: {class}"),
            format!("Ensure requirements for {class} are met"),
            format!("Verify {class} middleware passes"),
        ))
        .with_middleware_class(class.clone()),
    }
}

/// Static-table prerequisites for a whole middleware stack.
///
/// Names with no rule are skipped and logged at debug level.
pub fn middleware_prerequisites(
    middleware: &[MiddlewareRef],
    tables: &RuleTables,
) -> Vec<Prerequisite> {
    middleware
        .iter()
        .filter_map(|entry| match entry {
            MiddlewareRef::Opaque(handler) => Some(classify_opaque(handler)),
            MiddlewareRef::Named(name) => {
                let resolved = resolve(name, &tables.middleware, &tables.pattern);
                if resolved.is_none() {
                    tracing::debug!(middleware = %name, "no rule matches middleware");
                }
                resolved.map(Prerequisite::from)
            }
        })
        .collect()
}
