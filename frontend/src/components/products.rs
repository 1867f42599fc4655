use crate::auth::use_auth;
use crate::components::dialog::{DeleteButton, FormDialog, TextField};
use crate::components::table::{EmptyRow, QueryAlert};
use crate::format;
use crate::mutation::use_mutations;
use crate::query::use_query;
use crate::web::clock;
use leptos::prelude::*;
use martdesk_shared::catalog::{
    Product, ProductDraft, SubCategory, contains_ignore_case, parse_amount, parse_count,
};
use martdesk_shared::protocol::{Products, SubCategories};
use martdesk_shared::QueryKey;

/// 商品表单，数值字段以输入框原文保存，提交时再解析
#[derive(Clone, Copy)]
struct ProductForm {
    name: RwSignal<String>,
    description: RwSignal<String>,
    product_sku: RwSignal<String>,
    price: RwSignal<String>,
    stock: RwSignal<String>,
    sub_category: RwSignal<String>,
    is_available: RwSignal<bool>,
}

impl ProductForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            product_sku: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
            stock: RwSignal::new("0".to_string()),
            sub_category: RwSignal::new(String::new()),
            is_available: RwSignal::new(true),
        }
    }

    fn fill(&self, draft: &ProductDraft) {
        self.name.set(draft.name.clone());
        self.description.set(draft.description.clone());
        self.product_sku.set(draft.product_sku.clone());
        self.price.set(draft.price.to_string());
        self.stock.set(draft.stock.to_string());
        self.sub_category.set(draft.sub_category.clone());
        self.is_available.set(draft.is_available);
    }

    fn reset(&self) {
        self.fill(&ProductDraft {
            is_available: true,
            ..Default::default()
        });
        self.price.set(String::new());
    }

    fn to_draft(&self) -> Result<ProductDraft, &'static str> {
        let name = self.name.get_untracked().trim().to_string();
        if name.is_empty() {
            return Err("Please enter a product name");
        }
        let price =
            parse_amount(&self.price.get_untracked()).ok_or("Please enter a valid price")?;
        let stock =
            parse_count(&self.stock.get_untracked()).ok_or("Stock must be a whole number")?;
        let sub_category = self.sub_category.get_untracked();
        if sub_category.is_empty() {
            return Err("Please select a sub-category");
        }

        Ok(ProductDraft {
            name,
            description: self.description.get_untracked().trim().to_string(),
            product_sku: self.product_sku.get_untracked().trim().to_string(),
            price,
            stock,
            sub_category,
            is_available: self.is_available.get_untracked(),
        })
    }
}

#[component]
pub fn ProductsPage() -> impl IntoView {
    let auth = use_auth();
    let mutations = use_mutations();
    let offset = clock::local_offset();

    let products = use_query(QueryKey::Products, move || {
        let api = auth.api();
        async move { api.list::<Products>().await }
    });
    // 表格中的子分类名称与表单下拉框
    let subcategories = use_query(QueryKey::SubCategories, move || {
        let api = auth.api();
        async move { api.list::<SubCategories>().await }
    });

    let (search, set_search) = signal(String::new());
    let visible = Memo::new(move |_| {
        products.data.with(|data| {
            data.as_deref()
                .unwrap_or_default()
                .iter()
                .filter(|p| contains_ignore_case(&p.name, &search.get()))
                .cloned()
                .collect::<Vec<Product>>()
        })
    });
    let subs = Memo::new(move |_| subcategories.data.get().unwrap_or_default());

    let form = ProductForm::new();
    let open = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let deleting = RwSignal::new(false);
    let editing = RwSignal::new(Option::<String>::None);

    let on_submit = Callback::new(move |_| {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                mutations.reject(message);
                return;
            }
        };
        let api = auth.api();
        let target = editing.get_untracked();
        let message = if target.is_some() {
            "Product updated successfully!"
        } else {
            "Product created successfully!"
        };
        let pending = async move {
            match target {
                Some(id) => api.update::<Products>(id, draft).await,
                None => api.create::<Products>(draft).await,
            }
        };
        mutations.run(pending, message, saving, move || {
            open.set(false);
            form.reset();
        });
    });

    let title = Signal::derive(move || {
        if editing.get().is_some() {
            "Edit Product".to_string()
        } else {
            "Add Product".to_string()
        }
    });

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                    <h3 class="card-title">"Products"</h3>
                    <div class="flex gap-2">
                        <input
                            type="search"
                            placeholder="Search by name"
                            class="input input-bordered input-sm w-64"
                            on:input=move |ev| set_search.set(event_target_value(&ev))
                            prop:value=search
                        />
                        <button
                            class="btn btn-primary btn-sm"
                            on:click=move |_| {
                                editing.set(None);
                                form.reset();
                                open.set(true);
                            }
                        >
                            "Add Product"
                        </button>
                    </div>
                </div>

                <QueryAlert error=products.error />

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Image"</th>
                                <th>"Name"</th>
                                <th>"Price"</th>
                                <th>"Stock"</th>
                                <th>"Sub-Category"</th>
                                <th>"Available"</th>
                                <th class="hidden lg:table-cell">"Product Sku"</th>
                                <th class="hidden lg:table-cell">"Created At"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <EmptyRow
                                colspan=9
                                loading=products.loading
                                empty=Signal::derive(move || visible.with(Vec::is_empty))
                            />
                            <For
                                each=move || visible.get()
                                key=|p| (p.id.clone(), p.updated_at, p.stock, p.is_available)
                                children=move |product| {
                                    let id = product.id.clone();
                                    let edit_id = product.id.clone();
                                    let draft = ProductDraft::from(&product);
                                    let lookup = product.clone();
                                    let sub_name = move || {
                                        subs.with(|list: &Vec<SubCategory>| {
                                            lookup.sub_category_name(list).to_string()
                                        })
                                    };
                                    let on_edit = move |_| {
                                        editing.set(Some(edit_id.clone()));
                                        form.fill(&draft);
                                        open.set(true);
                                    };
                                    let on_delete = Callback::new(move |_| {
                                        let api = auth.api();
                                        let id = id.clone();
                                        mutations.run(
                                            async move { api.delete::<Products>(id).await },
                                            "Product deleted successfully!",
                                            deleting,
                                            || {},
                                        );
                                    });
                                    let (badge, available) = if product.is_available {
                                        ("badge badge-success", "Yes")
                                    } else {
                                        ("badge badge-ghost", "No")
                                    };
                                    view! {
                                        <tr>
                                            <td>
                                                {product
                                                    .product_image
                                                    .clone()
                                                    .map(|src| view! { <img class="w-12 h-12 rounded object-cover" src=src /> })}
                                            </td>
                                            <td class="font-medium">{product.name.clone()}</td>
                                            <td class="font-mono">{format::money(product.price)}</td>
                                            <td>{product.stock}</td>
                                            <td>{sub_name}</td>
                                            <td><span class=badge>{available}</span></td>
                                            <td class="hidden lg:table-cell font-mono text-sm">{product.product_sku.clone()}</td>
                                            <td class="hidden lg:table-cell">{format::date_time(product.created_at, offset)}</td>
                                            <td class="text-right whitespace-nowrap">
                                                <button class="btn btn-ghost btn-xs" on:click=on_edit>"Edit"</button>
                                                <DeleteButton on_confirm=on_delete busy=deleting />
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

        <FormDialog open=open title=title busy=saving on_submit=on_submit>
            <TextField label="Product Name" value=form.name required=true />
            <TextField label="Description" value=form.description />
            <div class="grid grid-cols-2 gap-4">
                <TextField label="Price" value=form.price kind="number" required=true placeholder="0.00" />
                <TextField label="Stock" value=form.stock kind="number" />
            </div>
            <TextField label="Product Sku" value=form.product_sku />
            <label class="form-control w-full">
                <div class="label">
                    <span class="label-text">"Sub Category"</span>
                </div>
                <select
                    class="select select-bordered w-full"
                    required
                    on:change=move |ev| form.sub_category.set(event_target_value(&ev))
                >
                    <option value="" disabled selected=move || form.sub_category.get().is_empty()>
                        "Select Sub Category"
                    </option>
                    <For
                        each=move || subs.get()
                        key=|s| s.id.clone()
                        children=move |s| {
                            let id = s.id.clone();
                            let selected = move || form.sub_category.get() == id;
                            view! {
                                <option value=s.id.clone() selected=selected>{s.name.clone()}</option>
                            }
                        }
                    />
                </select>
            </label>
            <label class="label cursor-pointer justify-start gap-3">
                <input
                    type="checkbox"
                    class="toggle toggle-primary"
                    prop:checked=move || form.is_available.get()
                    on:change=move |ev| form.is_available.set(event_target_checked(&ev))
                />
                <span class="label-text">"Available"</span>
            </label>
        </FormDialog>
    }
}
