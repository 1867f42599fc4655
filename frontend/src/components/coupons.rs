use crate::auth::use_auth;
use crate::components::dialog::{FormDialog, TextField};
use crate::components::table::{EmptyRow, QueryAlert};
use crate::format;
use crate::mutation::use_mutations;
use crate::query::use_query;
use crate::web::clock;
use leptos::prelude::*;
use martdesk_shared::catalog::{
    Coupon, CouponBatch, CouponDraft, DiscountType, filter_coupons, parse_amount, parse_count,
    parse_date,
};
use martdesk_shared::protocol::Coupons;
use martdesk_shared::QueryKey;

/// 空输入为 `None`，非空但无法解析为错误
fn optional<T>(
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    message: &'static str,
) -> Result<Option<T>, &'static str> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some).ok_or(message)
    }
}

#[derive(Clone, Copy)]
struct CouponForm {
    code: RwSignal<String>,
    description: RwSignal<String>,
    discount_type: RwSignal<DiscountType>,
    value: RwSignal<String>,
    min_order_total: RwSignal<String>,
    valid_from: RwSignal<String>,
    valid_to: RwSignal<String>,
    max_uses: RwSignal<String>,
    max_uses_per_user: RwSignal<String>,
}

impl CouponForm {
    fn new() -> Self {
        Self {
            code: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            discount_type: RwSignal::new(DiscountType::Percent),
            value: RwSignal::new(String::new()),
            min_order_total: RwSignal::new(String::new()),
            valid_from: RwSignal::new(String::new()),
            valid_to: RwSignal::new(String::new()),
            max_uses: RwSignal::new(String::new()),
            max_uses_per_user: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        for field in [
            self.code,
            self.description,
            self.value,
            self.min_order_total,
            self.valid_from,
            self.valid_to,
            self.max_uses,
            self.max_uses_per_user,
        ] {
            field.set(String::new());
        }
        self.discount_type.set(DiscountType::Percent);
    }

    fn to_draft(&self) -> Result<CouponDraft, &'static str> {
        let code = self.code.get_untracked().trim().to_string();
        if code.is_empty() {
            return Err("Please enter a coupon code");
        }
        let value =
            parse_amount(&self.value.get_untracked()).ok_or("Please enter a valid value")?;

        Ok(CouponDraft {
            code,
            description: self.description.get_untracked().trim().to_string(),
            discount_type: self.discount_type.get_untracked(),
            value,
            min_order_total: optional(
                &self.min_order_total.get_untracked(),
                parse_amount,
                "Minimum order total must be a number",
            )?,
            valid_from: optional(&self.valid_from.get_untracked(), parse_date, "Invalid start date")?,
            valid_to: optional(&self.valid_to.get_untracked(), parse_date, "Invalid end date")?,
            max_uses: optional(
                &self.max_uses.get_untracked(),
                parse_count,
                "Max uses must be a whole number",
            )?,
            max_uses_per_user: optional(
                &self.max_uses_per_user.get_untracked(),
                parse_count,
                "Max uses per user must be a whole number",
            )?,
        })
    }
}

/// 批量生成表单
#[derive(Clone, Copy)]
struct BatchForm {
    count: RwSignal<String>,
    discount_type: RwSignal<DiscountType>,
    value: RwSignal<String>,
    max_uses: RwSignal<String>,
    valid_from: RwSignal<String>,
    valid_to: RwSignal<String>,
}

impl BatchForm {
    fn new() -> Self {
        let defaults = CouponBatch::default();
        Self {
            count: RwSignal::new(defaults.count.to_string()),
            discount_type: RwSignal::new(defaults.discount_type),
            value: RwSignal::new(String::new()),
            max_uses: RwSignal::new(defaults.max_uses.to_string()),
            valid_from: RwSignal::new(String::new()),
            valid_to: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        let defaults = CouponBatch::default();
        self.count.set(defaults.count.to_string());
        self.discount_type.set(defaults.discount_type);
        self.value.set(String::new());
        self.max_uses.set(defaults.max_uses.to_string());
        self.valid_from.set(String::new());
        self.valid_to.set(String::new());
    }

    fn to_batch(&self) -> Result<CouponBatch, &'static str> {
        let count = parse_count(&self.count.get_untracked())
            .filter(|n| *n > 0)
            .ok_or("Count must be at least 1")?;
        let value =
            parse_amount(&self.value.get_untracked()).ok_or("Please enter a valid value")?;
        let max_uses = optional(
            &self.max_uses.get_untracked(),
            parse_count,
            "Max uses must be a whole number",
        )?
        .unwrap_or(1);

        Ok(CouponBatch {
            count,
            discount_type: self.discount_type.get_untracked(),
            value,
            max_uses,
            valid_from: optional(&self.valid_from.get_untracked(), parse_date, "Invalid start date")?,
            valid_to: optional(&self.valid_to.get_untracked(), parse_date, "Invalid end date")?,
        })
    }
}

#[component]
fn DiscountSelect(value: RwSignal<DiscountType>) -> impl IntoView {
    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">"Discount Type"</span>
            </div>
            <select
                class="select select-bordered w-full"
                on:change=move |ev| value.set(DiscountType::from_raw(&event_target_value(&ev)))
            >
                {DiscountType::CHOICES
                    .into_iter()
                    .map(|kind| {
                        view! {
                            <option value=kind.as_str() selected=move || value.get() == kind>
                                {kind.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </label>
    }
}

#[component]
pub fn CouponsPage() -> impl IntoView {
    let auth = use_auth();
    let mutations = use_mutations();
    let offset = clock::local_offset();

    let coupons = use_query(QueryKey::Coupons, move || {
        let api = auth.api();
        async move { api.list::<Coupons>().await }
    });

    let (search, set_search) = signal(String::new());
    let visible = Memo::new(move |_| {
        coupons.data.with(|data| {
            let list = data.as_deref().unwrap_or_default();
            filter_coupons(list, &search.get())
                .into_iter()
                .cloned()
                .collect::<Vec<Coupon>>()
        })
    });

    let form = CouponForm::new();
    let create_open = RwSignal::new(false);
    let creating = RwSignal::new(false);

    let batch = BatchForm::new();
    let generate_open = RwSignal::new(false);
    let generating = RwSignal::new(false);

    let on_create = Callback::new(move |_| {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                mutations.reject(message);
                return;
            }
        };
        let api = auth.api();
        mutations.run(
            async move { api.create::<Coupons>(draft).await },
            "Coupon created successfully!",
            creating,
            move || {
                create_open.set(false);
                form.reset();
            },
        );
    });

    let on_generate = Callback::new(move |_| {
        let request = match batch.to_batch() {
            Ok(request) => request,
            Err(message) => {
                mutations.reject(message);
                return;
            }
        };
        let api = auth.api();
        mutations.run(
            async move { api.generate_coupons(request).await },
            "Coupons generated successfully!",
            generating,
            move || {
                generate_open.set(false);
                batch.reset();
            },
        );
    });

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                    <h3 class="card-title">"Coupons"</h3>
                    <div class="flex flex-wrap gap-2">
                        <input
                            type="search"
                            placeholder="Search by code"
                            class="input input-bordered input-sm w-64"
                            on:input=move |ev| set_search.set(event_target_value(&ev))
                            prop:value=search
                        />
                        <button
                            class="btn btn-outline btn-sm"
                            on:click=move |_| {
                                batch.reset();
                                generate_open.set(true);
                            }
                        >
                            "Generate Coupons"
                        </button>
                        <button
                            class="btn btn-primary btn-sm"
                            on:click=move |_| {
                                form.reset();
                                create_open.set(true);
                            }
                        >
                            "New Coupon"
                        </button>
                    </div>
                </div>

                <QueryAlert error=coupons.error />

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Code"</th>
                                <th>"Type"</th>
                                <th>"Value"</th>
                                <th>"Active"</th>
                                <th class="hidden md:table-cell">"Valid From"</th>
                                <th class="hidden md:table-cell">"Valid To"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <EmptyRow
                                colspan=6
                                loading=coupons.loading
                                empty=Signal::derive(move || visible.with(Vec::is_empty))
                            />
                            <For
                                each=move || visible.get()
                                key=|c| (c.id.clone(), c.active, c.value)
                                children=move |coupon| {
                                    let (badge, active) = if coupon.active {
                                        ("badge badge-success", "Active")
                                    } else {
                                        ("badge badge-ghost", "Inactive")
                                    };
                                    view! {
                                        <tr>
                                            <td class="font-mono font-medium">{coupon.code.clone()}</td>
                                            <td>{coupon.discount_type.label()}</td>
                                            <td class="font-mono">
                                                {format::discount(coupon.discount_type, coupon.value)}
                                            </td>
                                            <td><span class=badge>{active}</span></td>
                                            <td class="hidden md:table-cell">{format::date(coupon.valid_from, offset)}</td>
                                            <td class="hidden md:table-cell">{format::date(coupon.valid_to, offset)}</td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>

        <FormDialog open=create_open title="Create Coupon" busy=creating on_submit=on_create>
            <TextField label="Code" value=form.code required=true placeholder="SUMMER10" />
            <DiscountSelect value=form.discount_type />
            <div class="grid grid-cols-2 gap-4">
                <TextField label="Value" value=form.value kind="number" required=true />
                <TextField label="Min Order Total" value=form.min_order_total kind="number" />
            </div>
            <div class="grid grid-cols-2 gap-4">
                <TextField label="Valid From" value=form.valid_from kind="date" />
                <TextField label="Valid To" value=form.valid_to kind="date" />
            </div>
            <div class="grid grid-cols-2 gap-4">
                <TextField label="Max Uses" value=form.max_uses kind="number" />
                <TextField label="Max Uses Per User" value=form.max_uses_per_user kind="number" />
            </div>
            <TextField label="Description" value=form.description />
        </FormDialog>

        <FormDialog open=generate_open title="Generate Coupons" busy=generating on_submit=on_generate>
            <TextField label="Count" value=batch.count kind="number" required=true />
            <DiscountSelect value=batch.discount_type />
            <div class="grid grid-cols-2 gap-4">
                <TextField label="Value" value=batch.value kind="number" required=true />
                <TextField label="Max Uses" value=batch.max_uses kind="number" />
            </div>
            <div class="grid grid-cols-2 gap-4">
                <TextField label="Valid From" value=batch.valid_from kind="date" />
                <TextField label="Valid To" value=batch.valid_to kind="date" />
            </div>
        </FormDialog>
    }
}
