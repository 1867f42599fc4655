use crate::auth::use_auth;
use crate::components::dialog::{DeleteButton, FormDialog, TextField};
use crate::components::table::{EmptyRow, QueryAlert};
use crate::mutation::use_mutations;
use crate::query::use_query;
use leptos::prelude::*;
use martdesk_shared::catalog::{SubCategory, SubCategoryDraft};
use martdesk_shared::protocol::{Categories, SubCategories};
use martdesk_shared::QueryKey;

#[derive(Clone, Copy)]
struct SubCategoryForm {
    name: RwSignal<String>,
    description: RwSignal<String>,
    category: RwSignal<String>,
}

impl SubCategoryForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            category: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, draft: SubCategoryDraft) {
        self.name.set(draft.name);
        self.description.set(draft.description);
        self.category.set(draft.category);
    }

    fn reset(&self) {
        self.fill(SubCategoryDraft::default());
    }

    /// 三个字段都必填
    fn to_draft(&self) -> Option<SubCategoryDraft> {
        let draft = SubCategoryDraft {
            name: self.name.get_untracked().trim().to_string(),
            description: self.description.get_untracked().trim().to_string(),
            category: self.category.get_untracked(),
        };
        let complete =
            !draft.name.is_empty() && !draft.description.is_empty() && !draft.category.is_empty();
        complete.then_some(draft)
    }
}

#[component]
pub fn SubCategoriesPage() -> impl IntoView {
    let auth = use_auth();
    let mutations = use_mutations();

    let subcategories = use_query(QueryKey::SubCategories, move || {
        let api = auth.api();
        async move { api.list::<SubCategories>().await }
    });
    // 父分类下拉框
    let categories = use_query(QueryKey::Categories, move || {
        let api = auth.api();
        async move { api.list::<Categories>().await }
    });

    let form = SubCategoryForm::new();
    let open = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let deleting = RwSignal::new(false);
    let editing = RwSignal::new(Option::<String>::None);

    let rows = move || subcategories.data.get().unwrap_or_default();

    let on_submit = Callback::new(move |_| {
        let Some(draft) = form.to_draft() else {
            mutations.reject("All fields are required");
            return;
        };
        let api = auth.api();
        let target = editing.get_untracked();
        let message = if target.is_some() {
            "Subcategory updated!"
        } else {
            "Subcategory added!"
        };
        let pending = async move {
            match target {
                Some(id) => api.update::<SubCategories>(id, draft).await,
                None => api.create::<SubCategories>(draft).await,
            }
        };
        mutations.run(pending, message, saving, move || {
            open.set(false);
            form.reset();
        });
    });

    let title = Signal::derive(move || {
        if editing.get().is_some() {
            "Edit Subcategory".to_string()
        } else {
            "Add Subcategory".to_string()
        }
    });

    let edit = move |sub: &SubCategory| {
        let draft = categories.data.with_untracked(|cats| {
            SubCategoryDraft::from_existing(sub, cats.as_deref().unwrap_or_default())
        });
        editing.set(Some(sub.id.clone()));
        form.fill(draft);
        open.set(true);
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                    <h3 class="card-title">"Sub Categories"</h3>
                    <button
                        class="btn btn-primary btn-sm"
                        on:click=move |_| {
                            editing.set(None);
                            form.reset();
                            open.set(true);
                        }
                    >
                        "Add Subcategory"
                    </button>
                </div>

                <QueryAlert error=subcategories.error />

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"ID"</th>
                                <th>"Name"</th>
                                <th class="hidden md:table-cell">"Description"</th>
                                <th>"Category"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <EmptyRow
                                colspan=5
                                loading=subcategories.loading
                                empty=Signal::derive(move || {
                                    subcategories.data.with(|d| d.as_ref().is_none_or(Vec::is_empty))
                                })
                            />
                            <For
                                each=rows
                                key=|s| (s.id.clone(), s.name.clone(), s.description.clone(), s.category.clone())
                                children=move |sub| {
                                    let id = sub.id.clone();
                                    let row = sub.clone();
                                    let on_delete = Callback::new(move |_| {
                                        let api = auth.api();
                                        let id = id.clone();
                                        mutations.run(
                                            async move { api.delete::<SubCategories>(id).await },
                                            "Subcategory deleted!",
                                            deleting,
                                            || {},
                                        );
                                    });
                                    let category = if sub.category.is_empty() {
                                        "N/A".to_string()
                                    } else {
                                        sub.category.clone()
                                    };
                                    view! {
                                        <tr>
                                            <td class="font-mono text-sm">{sub.id.clone()}</td>
                                            <td class="font-medium">{sub.name.clone()}</td>
                                            <td class="hidden md:table-cell">{sub.description.clone()}</td>
                                            <td>{category}</td>
                                            <td class="text-right whitespace-nowrap">
                                                <button class="btn btn-ghost btn-xs" on:click=move |_| edit(&row)>
                                                    "Edit"
                                                </button>
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
            <TextField label="Name" value=form.name required=true placeholder="Enter Name" />
            <TextField label="Description" value=form.description required=true placeholder="Enter Description" />
            <label class="form-control w-full">
                <div class="label">
                    <span class="label-text">"Category"</span>
                </div>
                <select
                    class="select select-bordered w-full"
                    required
                    on:change=move |ev| form.category.set(event_target_value(&ev))
                >
                    <option value="" disabled selected=move || form.category.get().is_empty()>
                        "Select Category"
                    </option>
                    <For
                        each=move || categories.data.get().unwrap_or_default()
                        key=|c| c.id.clone()
                        children=move |c| {
                            let id = c.id.clone();
                            let selected = move || form.category.get() == id;
                            view! {
                                <option value=c.id.clone() selected=selected>{c.name.clone()}</option>
                            }
                        }
                    />
                </select>
            </label>
        </FormDialog>
    }
}
