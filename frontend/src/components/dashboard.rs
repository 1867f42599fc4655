use crate::auth::use_auth;
use crate::components::tags::StatusBadge;
use crate::format;
use crate::query::use_query;
use crate::web::clock;
use leptos::prelude::*;
use martdesk_shared::metrics::{MonthlyBucket, StatusCategory};
use martdesk_shared::{DashboardMetrics, QueryKey};
use rust_decimal::Decimal;

/// 柱状图宽度（相对最大值的百分比）
fn bar_width(value: Decimal, max: Decimal) -> String {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return "0%".to_string();
    }
    let pct = (value * Decimal::ONE_HUNDRED / max).round_dp(1);
    format!("{:.1}%", pct.min(Decimal::ONE_HUNDRED))
}

fn status_class(category: StatusCategory) -> &'static str {
    match category {
        StatusCategory::Approved => "progress progress-success",
        StatusCategory::Pending => "progress progress-warning",
        StatusCategory::Cancelled => "progress progress-error",
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let api = auth.api();

    let orders = use_query(QueryKey::Orders, move || {
        let api = api.clone();
        async move { api.get_orders().await }
    });

    let offset = clock::local_offset();

    // 每次订单快照变化时从头计算
    let metrics = Memo::new(move |_| {
        orders.data.with(|data| {
            let list = data.as_deref().unwrap_or_default();
            DashboardMetrics::compute(list, clock::now(), offset)
        })
    });

    view! {
        <Show when=move || orders.error.get().is_some()>
            <div role="alert" class="alert alert-error">
                <span>
                    "Failed to load orders: "
                    {move || orders.error.get().map(|e| e.message().to_string()).unwrap_or_default()}
                </span>
            </div>
        </Show>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Total Orders"</div>
                <div class="stat-value text-primary">{move || metrics.with(|m| m.summary.total_orders)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Paid Orders"</div>
                <div class="stat-value text-success">{move || metrics.with(|m| m.summary.paid_orders)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Processing"</div>
                <div class="stat-value text-warning">{move || metrics.with(|m| m.summary.processing_orders)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Revenue"</div>
                <div class="stat-value text-secondary text-2xl">
                    {move || metrics.with(|m| format::money(m.summary.revenue))}
                </div>
                <div class="stat-desc">"Paid orders only"</div>
            </div>
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-2 gap-8">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Monthly Revenue"</h3>
                    <Show
                        when=move || metrics.with(|m| !m.monthly.is_empty())
                        fallback=|| view! { <p class="text-base-content/50">"No dated orders yet."</p> }
                    >
                        <MonthlyChart buckets=Signal::derive(move || metrics.with(|m| m.monthly.clone())) />
                    </Show>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Order Status"</h3>
                    {move || {
                        let status = metrics.with(|m| m.status);
                        let total: usize = status.iter().map(|s| s.count).sum();
                        status
                            .into_iter()
                            .map(|slice| {
                                view! {
                                    <div class="flex items-center gap-4">
                                        <span class="w-24">{slice.category.label()}</span>
                                        <progress
                                            class=status_class(slice.category)
                                            value=slice.count.to_string()
                                            max=total.max(1).to_string()
                                        ></progress>
                                        <span class="w-10 text-right font-mono">{slice.count}</span>
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </div>
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-3 gap-8">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Payment Methods"</h3>
                    <Show
                        when=move || metrics.with(|m| !m.payment_methods.is_empty())
                        fallback=|| view! { <p class="text-base-content/50">"No orders yet."</p> }
                    >
                        {move || {
                            metrics
                                .with(|m| m.payment_methods.clone())
                                .into_iter()
                                .map(|slice| {
                                    view! {
                                        <div class="space-y-1">
                                            <div class="flex justify-between text-sm">
                                                <span>{slice.method}</span>
                                                <span class="font-mono">
                                                    {slice.count} " · " {format::percent(slice.percentage)}
                                                </span>
                                            </div>
                                            <div class="h-2 rounded bg-base-200">
                                                <div
                                                    class="h-2 rounded bg-accent"
                                                    style:width=bar_width(slice.percentage, Decimal::ONE_HUNDRED)
                                                ></div>
                                            </div>
                                        </div>
                                    }
                                })
                                .collect_view()
                        }}
                    </Show>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl lg:col-span-2">
                <div class="card-body p-0">
                    <div class="p-6 pb-2">
                        <h3 class="card-title">"Recent Orders"</h3>
                        <p class="text-base-content/70 text-sm">"Placed in the last 24 hours."</p>
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Order"</th>
                                    <th>"Placed By"</th>
                                    <th>"Date"</th>
                                    <th>"Amount"</th>
                                    <th>"Status"</th>
                                    <th>"Payment"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || metrics.with(|m| m.recent.is_empty()) && !orders.loading.get()>
                                    <tr>
                                        <td colspan="6" class="text-center py-8 text-base-content/50">
                                            "No orders in the last 24 hours."
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || orders.loading.get() && orders.data.with(|d| d.is_none())>
                                    <tr>
                                        <td colspan="6" class="text-center py-8 text-base-content/50">
                                            <span class="loading loading-spinner loading-md"></span> " Loading..."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || metrics.with(|m| m.recent.clone())
                                    key=|o| o.order_id.clone()
                                    children=move |order| {
                                        view! {
                                            <tr>
                                                <td class="font-mono text-sm">{order.short_id().to_string()}</td>
                                                <td>{order.placed_by.clone()}</td>
                                                <td>{format::date_time(order.order_date, offset)}</td>
                                                <td class="font-mono">{format::money(order.total_amount)}</td>
                                                <td><StatusBadge raw=order.status.as_str().to_string() /></td>
                                                <td><StatusBadge raw=order.payment_status.as_str().to_string() /></td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}

/// 月度营收柱状图（横向）
#[component]
fn MonthlyChart(buckets: Signal<Vec<MonthlyBucket>>) -> impl IntoView {
    move || {
        let buckets = buckets.get();
        let max = buckets
            .iter()
            .map(|b| b.revenue)
            .max()
            .unwrap_or(Decimal::ZERO);

        buckets
            .into_iter()
            .map(|bucket| {
                view! {
                    <div class="flex items-center gap-4">
                        <span class="w-20 text-sm">{bucket.month_key.clone()}</span>
                        <div class="flex-1 h-4 rounded bg-base-200">
                            <div
                                class="h-4 rounded bg-primary"
                                style:width=bar_width(bucket.revenue, max)
                            ></div>
                        </div>
                        <span class="w-28 text-right font-mono text-sm">
                            {format::money(bucket.revenue)}
                        </span>
                        <span class="w-12 text-right text-xs opacity-60">{bucket.order_count}</span>
                    </div>
                }
            })
            .collect_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width_relative_to_max() {
        assert_eq!(bar_width(Decimal::from(50), Decimal::from(200)), "25.0%");
        assert_eq!(bar_width(Decimal::from(200), Decimal::from(200)), "100.0%");
    }

    #[test]
    fn test_bar_width_handles_empty_series() {
        assert_eq!(bar_width(Decimal::ZERO, Decimal::ZERO), "0%");
        assert_eq!(bar_width(Decimal::from(-5), Decimal::from(10)), "0%");
    }
}
