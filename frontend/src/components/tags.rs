use leptos::prelude::*;
use martdesk_shared::order::{StatusTag, TagColor};

fn badge_class(color: TagColor) -> &'static str {
    match color {
        TagColor::Green => "badge badge-success",
        TagColor::Red => "badge badge-error",
        TagColor::Gold => "badge badge-warning",
    }
}

/// 订单状态 / 支付状态标签
#[component]
pub fn StatusBadge(#[prop(into)] raw: String) -> impl IntoView {
    let tag = StatusTag::for_status(&raw);
    view! { <span class=badge_class(tag.color)>{tag.label}</span> }
}
