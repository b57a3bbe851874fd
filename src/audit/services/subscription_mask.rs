//! Subscription id masking for shared reports.

/// Replaces every character except dashes and the last four with `x`.
pub fn mask_subscription_id(subscription_id: &str, mask: bool) -> String {
    if !mask {
        return subscription_id.to_string();
    }
    let total = subscription_id.chars().count();
    let visible_from = total.saturating_sub(4);
    subscription_id
        .chars()
        .enumerate()
        .map(|(i, c)| if i >= visible_from || c == '-' { c } else { 'x' })
        .collect()
}

/// Masks the subscription segment of a resource id, leaving the rest intact.
pub fn mask_subscription_in_resource_id(resource_id: &str, mask: bool) -> String {
    if !mask {
        return resource_id.to_string();
    }
    let mut parts: Vec<String> = resource_id.split('/').map(str::to_string).collect();
    if parts.len() > 2 && parts[1].eq_ignore_ascii_case("subscriptions") {
        parts[2] = mask_subscription_id(&parts[2], true);
    }
    parts.join("/")
}
