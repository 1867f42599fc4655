use crate::auth::use_auth;
use crate::components::dialog::{DeleteButton, FormDialog, TextField};
use crate::components::table::{EmptyRow, QueryAlert};
use crate::mutation::use_mutations;
use crate::query::use_query;
use leptos::prelude::*;
use martdesk_shared::catalog::{Category, CategoryDraft, contains_ignore_case};
use martdesk_shared::protocol::Categories;
use martdesk_shared::QueryKey;

/// 分类表单
#[derive(Clone, Copy)]
struct CategoryForm {
    name: RwSignal<String>,
    description: RwSignal<String>,
}

impl CategoryForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, draft: CategoryDraft) {
        self.name.set(draft.name);
        self.description.set(draft.description);
    }

    fn reset(&self) {
        self.fill(CategoryDraft::default());
    }

    fn to_draft(&self) -> CategoryDraft {
        CategoryDraft {
            name: self.name.get_untracked().trim().to_string(),
            description: self.description.get_untracked().trim().to_string(),
        }
    }
}

#[component]
pub fn CategoriesPage() -> impl IntoView {
    let auth = use_auth();
    let mutations = use_mutations();

    let categories = use_query(QueryKey::Categories, move || {
        let api = auth.api();
        async move { api.list::<Categories>().await }
    });

    let (search, set_search) = signal(String::new());
    let visible = Memo::new(move |_| {
        categories.data.with(|data| {
            data.as_deref()
                .unwrap_or_default()
                .iter()
                .filter(|c| contains_ignore_case(&c.name, &search.get()))
                .cloned()
                .collect::<Vec<Category>>()
        })
    });

    let form = CategoryForm::new();
    let open = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let deleting = RwSignal::new(false);
    // 正在编辑的分类 id，新建时为 None
    let editing = RwSignal::new(Option::<String>::None);

    let open_create = move |_| {
        editing.set(None);
        form.reset();
        open.set(true);
    };

    let on_submit = Callback::new(move |_| {
        let draft = form.to_draft();
        let api = auth.api();
        let target = editing.get_untracked();
        let message = if target.is_some() {
            "Category updated successfully!"
        } else {
            "Category added successfully!"
        };
        let pending = async move {
            match target {
                Some(id) => api.update::<Categories>(id, draft).await,
                None => api.create::<Categories>(draft).await,
            }
        };
        mutations.run(pending, message, saving, move || {
            open.set(false);
            form.reset();
        });
    });

    let title = Signal::derive(move || {
        if editing.get().is_some() {
            "Edit Category".to_string()
        } else {
            "Add New Category".to_string()
        }
    });

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                    <h3 class="card-title">"Categories"</h3>
                    <div class="flex gap-2">
                        <input
                            type="search"
                            placeholder="Search by name"
                            class="input input-bordered input-sm w-64"
                            on:input=move |ev| set_search.set(event_target_value(&ev))
                            prop:value=search
                        />
                        <button class="btn btn-primary btn-sm" on:click=open_create>
                            "Add Category"
                        </button>
                    </div>
                </div>

                <QueryAlert error=categories.error />

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Image"</th>
                                <th>"Name"</th>
                                <th class="hidden md:table-cell">"Description"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <EmptyRow
                                colspan=4
                                loading=categories.loading
                                empty=Signal::derive(move || visible.with(Vec::is_empty))
                            />
                            <For
                                each=move || visible.get()
                                key=|c| (c.id.clone(), c.name.clone(), c.description.clone())
                                children=move |category| {
                                    let id = category.id.clone();
                                    let edit_id = category.id.clone();
                                    let draft = CategoryDraft::from(&category);
                                    let on_edit = move |_| {
                                        editing.set(Some(edit_id.clone()));
                                        form.fill(draft.clone());
                                        open.set(true);
                                    };
                                    let on_delete = Callback::new(move |_| {
                                        let api = auth.api();
                                        let id = id.clone();
                                        mutations.run(
                                            async move { api.delete::<Categories>(id).await },
                                            "Category deleted successfully!",
                                            deleting,
                                            || {},
                                        );
                                    });
                                    view! {
                                        <tr>
                                            <td>
                                                {category
                                                    .category_image
                                                    .clone()
                                                    .map(|src| view! { <img class="w-12 h-12 rounded object-cover" src=src /> })}
                                            </td>
                                            <td class="font-medium">{category.name.clone()}</td>
                                            <td class="hidden md:table-cell">{category.description.clone()}</td>
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
            <TextField label="Category Name" value=form.name required=true placeholder="Enter category name" />
            <TextField label="Description" value=form.description />
        </FormDialog>
    }
}
