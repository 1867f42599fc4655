use crate::auth::use_auth;
use crate::components::tags::StatusBadge;
use crate::components::toast::use_toast;
use crate::format;
use crate::query::{use_query, use_query_client};
use crate::web::clock;
use leptos::prelude::*;
use leptos::task::spawn_local;
use martdesk_shared::order::sort_newest_first;
use martdesk_shared::{Order, QueryKey};

/// 订单操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderAction {
    Approve,
    Cancel,
}

impl OrderAction {
    fn done_message(&self) -> &'static str {
        match self {
            Self::Approve => "Order approved",
            Self::Cancel => "Order cancelled",
        }
    }
}

#[component]
pub fn OrdersPage() -> impl IntoView {
    let auth = use_auth();
    let toast = use_toast();
    let queries = use_query_client();
    let offset = clock::local_offset();

    let orders = use_query(QueryKey::Orders, move || {
        let api = auth.api();
        async move {
            let mut list = api.get_orders().await?;
            sort_newest_first(&mut list);
            Ok(list)
        }
    });

    // 当前选中的订单（单选）
    let selected = RwSignal::new(Option::<String>::None);
    // 详情抽屉中显示的订单
    let detail = RwSignal::new(Option::<String>::None);
    let (in_flight, set_in_flight) = signal(false);

    // 刷新后选中的订单若已取消或消失，取消选中
    Effect::new(move |_| {
        let Some(id) = selected.get_untracked() else {
            return;
        };
        let still_selectable = orders.data.with(|data| {
            data.as_ref()
                .and_then(|list| list.iter().find(|o| o.order_id == id))
                .is_some_and(Order::is_selectable)
        });
        if !still_selectable {
            selected.set(None);
        }
    });

    let toggle_select = move |order: &Order| {
        if !order.is_selectable() {
            return;
        }
        let id = order.order_id.clone();
        selected.update(|current| {
            *current = if current.as_deref() == Some(id.as_str()) {
                None
            } else {
                Some(id)
            };
        });
    };

    let run_action = move |action: OrderAction| {
        let Some(order_id) = selected.get_untracked() else {
            return;
        };
        let api = auth.api();
        set_in_flight.set(true);
        spawn_local(async move {
            let result = match action {
                OrderAction::Approve => api.approve_order(order_id).await,
                OrderAction::Cancel => api.cancel_order(order_id).await,
            };
            match result {
                Ok(keys) => {
                    toast.success(action.done_message());
                    queries.invalidate(&keys);
                }
                Err(e) => toast.error(e.message().to_string()),
            }
            set_in_flight.set(false);
        });
    };

    let no_selection = move || selected.get().is_none() || in_flight.get();
    let order_count = move || orders.data.with(|d| d.as_ref().map_or(0, Vec::len));

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                    <div>
                        <h3 class="card-title">"Orders"</h3>
                        <p class="text-base-content/70 text-sm">
                            "Select an order to approve or cancel it."
                        </p>
                    </div>
                    <div class="flex gap-2">
                        <button
                            class="btn btn-success btn-sm"
                            disabled=no_selection
                            on:click=move |_| run_action(OrderAction::Approve)
                        >
                            "Approve"
                        </button>
                        <button
                            class="btn btn-error btn-outline btn-sm"
                            disabled=no_selection
                            on:click=move |_| run_action(OrderAction::Cancel)
                        >
                            "Cancel Order"
                        </button>
                        <button
                            class="btn btn-ghost btn-sm"
                            disabled=move || orders.loading.get()
                            on:click=move |_| queries.invalidate(&[QueryKey::Orders])
                        >
                            "Refresh"
                        </button>
                    </div>
                </div>

                <Show when=move || orders.error.get().is_some()>
                    <div role="alert" class="alert alert-error mx-6">
                        <span>
                            {move || orders.error.get().map(|e| e.message().to_string()).unwrap_or_default()}
                        </span>
                    </div>
                </Show>

                <div class="overflow-x-auto w-full">
                    <table class="table w-full">
                        <thead>
                            <tr>
                                <th></th>
                                <th>"Order ID"</th>
                                <th>"Placed By"</th>
                                <th>"Order Date"</th>
                                <th>"Items"</th>
                                <th>"Total"</th>
                                <th>"Status"</th>
                                <th>"Payment"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || order_count() == 0 && !orders.loading.get()>
                                <tr>
                                    <td colspan="9" class="text-center py-8 text-base-content/50">
                                        "No orders found."
                                    </td>
                                </tr>
                            </Show>
                            <Show when=move || orders.loading.get() && order_count() == 0>
                                <tr>
                                    <td colspan="9" class="text-center py-8 text-base-content/50">
                                        <span class="loading loading-spinner loading-md"></span> " Loading..."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || orders.data.get().unwrap_or_default()
                                key=|o| (o.order_id.clone(), o.status.as_str().to_string())
                                children=move |order| {
                                    let id = order.order_id.clone();
                                    let row_id = id.clone();
                                    let selectable = order.is_selectable();
                                    let is_selected = move || selected.get().as_deref() == Some(row_id.as_str());
                                    let is_checked = is_selected.clone();
                                    let row = order.clone();
                                    view! {
                                        <tr
                                            class=move || if is_selected() { "bg-primary/10" } else { "hover" }
                                            class:opacity-50=!selectable
                                            on:click=move |_| toggle_select(&row)
                                        >
                                            <td>
                                                <input
                                                    type="radio"
                                                    class="radio radio-sm radio-primary"
                                                    disabled=!selectable
                                                    prop:checked=is_checked
                                                />
                                            </td>
                                            <td class="font-mono text-sm">{order.short_id().to_string()}</td>
                                            <td>{order.placed_by.clone()}</td>
                                            <td>{format::date_time(order.order_date, offset)}</td>
                                            <td>{order.order_items.len()}</td>
                                            <td class="font-mono">{format::money(order.items_subtotal())}</td>
                                            <td><StatusBadge raw=order.status.as_str().to_string() /></td>
                                            <td><StatusBadge raw=order.payment_status.as_str().to_string() /></td>
                                            <td>
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    on:click=move |ev| {
                                                        ev.stop_propagation();
                                                        detail.set(Some(id.clone()));
                                                    }
                                                >
                                                    "Details"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>

        {move || {
            detail
                .get()
                .map(|order_id| {
                    let on_close = Callback::new(move |_| detail.set(None));
                    view! { <OrderDrawer order_id=order_id on_close=on_close /> }
                })
        }}
    }
}

/// 订单详情抽屉
#[component]
fn OrderDrawer(order_id: String, on_close: Callback<()>) -> impl IntoView {
    let auth = use_auth();
    let offset = clock::local_offset();

    let fetch_id = order_id.clone();
    let order = use_query(QueryKey::Order(order_id.clone()), move || {
        let api = auth.api();
        let id = fetch_id.clone();
        async move { api.get_order(id).await }
    });

    view! {
        <div class="fixed inset-0 z-40 flex justify-end">
            <div class="absolute inset-0 bg-black/30" on:click=move |_| on_close.run(())></div>
            <aside class="relative w-full max-w-md h-full bg-base-100 shadow-2xl overflow-y-auto p-6 space-y-4">
                <div class="flex items-center justify-between">
                    <h3 class="text-lg font-bold">"Order " {order_id.clone()}</h3>
                    <button class="btn btn-sm btn-circle btn-ghost" on:click=move |_| on_close.run(())>
                        "✕"
                    </button>
                </div>

                <Show when=move || order.loading.get() && order.data.with(|d| d.is_none())>
                    <div class="flex justify-center py-8">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                <Show when=move || order.error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>
                            {move || order.error.get().map(|e| e.message().to_string()).unwrap_or_default()}
                        </span>
                    </div>
                </Show>

                {move || order.data.get().map(|o| view! { <OrderDetail order=o offset=offset /> })}
            </aside>
        </div>
    }
}

#[component]
fn OrderDetail(order: Order, offset: chrono::FixedOffset) -> impl IntoView {
    let items_total = order.items_subtotal();
    let discrepancy = order.total_discrepancy();
    let total_amount = order.total_amount;

    view! {
        <dl class="grid grid-cols-2 gap-2 text-sm">
            <dt class="opacity-60">"Placed By"</dt>
            <dd>{order.placed_by.clone()}</dd>
            <dt class="opacity-60">"Shipping Address"</dt>
            <dd>{order.shipping_address.clone().unwrap_or_else(|| "-".to_string())}</dd>
            <dt class="opacity-60">"Payment"</dt>
            <dd class="flex gap-2 items-center">
                <StatusBadge raw=order.payment_status.as_str().to_string() />
                <span>{order.payment_method_label().to_string()}</span>
            </dd>
            <dt class="opacity-60">"Order Date"</dt>
            <dd>{format::date_time(order.order_date, offset)}</dd>
            <dt class="opacity-60">"Status"</dt>
            <dd><StatusBadge raw=order.status.as_str().to_string() /></dd>
        </dl>

        <div class="divider">"Items"</div>
        <ul class="space-y-3">
            {order
                .order_items
                .iter()
                .map(|item| {
                    let details = &item.product_details;
                    let category = details
                        .sub_category
                        .as_ref()
                        .map(|c| c.name.clone())
                        .unwrap_or_default();
                    view! {
                        <li class="flex items-center gap-3">
                            {details
                                .product_image
                                .clone()
                                .map(|src| view! { <img class="w-12 h-12 rounded object-cover" src=src /> })}
                            <div class="flex-1">
                                <div class="font-medium">{details.name.clone()}</div>
                                <div class="text-xs opacity-60">{category}</div>
                            </div>
                            <div class="text-right text-sm">
                                <div>"× " {item.quantity}</div>
                                <div class="font-mono">{format::money(item.subtotal)}</div>
                            </div>
                        </li>
                    }
                })
                .collect_view()}
        </ul>

        <div class="flex justify-between font-semibold border-t pt-3">
            <span>"Total"</span>
            <span class="font-mono">{format::money(items_total)}</span>
        </div>

        {discrepancy
            .map(|diff| {
                view! {
                    <div role="alert" class="alert alert-warning text-sm">
                        <span>
                            "Order total recorded by the server is "
                            {format::money(total_amount)}
                            ", which differs from the item subtotals by "
                            {format::money(diff.abs())}
                            "."
                        </span>
                    </div>
                }
            })}
    }
}
