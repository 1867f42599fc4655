use crate::auth::use_auth;
use crate::components::dialog::{FormDialog, TextField};
use crate::mutation::use_mutations;
use crate::query::use_query;
use leptos::prelude::*;
use martdesk_shared::user::filter_customers;
use martdesk_shared::{Customer, ModeratorDraft, QueryKey};

/// 新建版主表单
#[derive(Clone, Copy)]
struct ModeratorForm {
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    email: RwSignal<String>,
    phone: RwSignal<String>,
    password: RwSignal<String>,
    confirm_password: RwSignal<String>,
}

impl ModeratorForm {
    fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            confirm_password: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        for field in [
            self.first_name,
            self.last_name,
            self.email,
            self.phone,
            self.password,
            self.confirm_password,
        ] {
            field.set(String::new());
        }
    }

    fn to_draft(&self) -> ModeratorDraft {
        ModeratorDraft {
            first_name: self.first_name.get_untracked().trim().to_string(),
            last_name: self.last_name.get_untracked().trim().to_string(),
            email: self.email.get_untracked().trim().to_string(),
            phone: self.phone.get_untracked().trim().to_string(),
            password: self.password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
        }
    }
}

#[component]
fn CreateModerator() -> impl IntoView {
    let auth = use_auth();
    let mutations = use_mutations();
    let form = ModeratorForm::new();
    let open = RwSignal::new(false);
    let saving = RwSignal::new(false);

    let on_submit = Callback::new(move |_| {
        let draft = form.to_draft();
        if !draft.passwords_match() {
            mutations.reject("Passwords do not match");
            return;
        }
        let api = auth.api();
        mutations.run(
            async move { api.create_moderator(draft).await },
            "Moderator created successfully!",
            saving,
            move || {
                open.set(false);
                form.reset();
            },
        );
    });

    view! {
        <button
            class="btn btn-primary btn-sm"
            on:click=move |_| {
                form.reset();
                open.set(true);
            }
        >
            "Create Moderator"
        </button>

        <FormDialog open=open title="Create Moderator" busy=saving on_submit=on_submit>
            <div class="grid grid-cols-2 gap-4">
                <TextField label="First Name" value=form.first_name required=true />
                <TextField label="Last Name" value=form.last_name required=true />
            </div>
            <TextField label="Email" value=form.email kind="email" required=true />
            <TextField label="Phone" value=form.phone kind="tel" required=true />
            <TextField label="Password" value=form.password kind="password" required=true />
            <TextField
                label="Confirm Password"
                value=form.confirm_password
                kind="password"
                required=true
            />
        </FormDialog>
    }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let auth = use_auth();

    let analytics = use_query(QueryKey::UserAnalytics, move || {
        let api = auth.api();
        async move { api.get_user_analytics().await }
    });
    let customers = use_query(QueryKey::Customers, move || {
        let api = auth.api();
        async move { api.get_customers().await }
    });

    let (search, set_search) = signal(String::new());

    let totals = move || analytics.data.get().unwrap_or_default().totals;
    let visible = Memo::new(move |_| {
        customers.data.with(|data| {
            let list = data.as_deref().unwrap_or_default();
            filter_customers(list, &search.get())
                .into_iter()
                .cloned()
                .collect::<Vec<Customer>>()
        })
    });

    view! {
        <Show when=move || analytics.error.get().is_some()>
            <div role="alert" class="alert alert-error">
                <span>
                    "Failed to load user analytics: "
                    {move || analytics.error.get().map(|e| e.message().to_string()).unwrap_or_default()}
                </span>
            </div>
        </Show>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Active Users"</div>
                <div class="stat-value text-primary">{move || totals().active_users}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Verified"</div>
                <div class="stat-value text-success">{move || totals().verified_users}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Unverified"</div>
                <div class="stat-value text-warning">{move || totals().unverified_users()}</div>
            </div>
        </div>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Customers"</div>
                <div class="stat-value text-2xl">{move || totals().by_role.customer}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Admins"</div>
                <div class="stat-value text-2xl">{move || totals().by_role.admin}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Moderators"</div>
                <div class="stat-value text-2xl">{move || totals().by_role.moderator}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Superusers"</div>
                <div class="stat-value text-2xl">{move || totals().by_role.superusers}</div>
            </div>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                    <div>
                        <h3 class="card-title">"Customers"</h3>
                        <p class="text-base-content/70 text-sm">"Search by name or email."</p>
                    </div>
                    <div class="flex flex-wrap gap-2">
                        <input
                            type="search"
                            placeholder="Search..."
                            class="input input-bordered input-sm w-full max-w-xs"
                            on:input=move |ev| set_search.set(event_target_value(&ev))
                            prop:value=search
                        />
                        <CreateModerator />
                    </div>
                </div>

                <Show when=move || customers.error.get().is_some()>
                    <div role="alert" class="alert alert-error mx-6">
                        <span>
                            {move || customers.error.get().map(|e| e.message().to_string()).unwrap_or_default()}
                        </span>
                    </div>
                </Show>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Email"</th>
                                <th class="hidden md:table-cell">"Phone"</th>
                                <th>"Verified"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || customers.loading.get() && customers.data.with(|d| d.is_none())>
                                <tr>
                                    <td colspan="4" class="text-center py-8 text-base-content/50">
                                        <span class="loading loading-spinner loading-md"></span> " Loading..."
                                    </td>
                                </tr>
                            </Show>
                            <Show when=move || visible.with(|v| v.is_empty()) && !customers.loading.get()>
                                <tr>
                                    <td colspan="4" class="text-center py-8 text-base-content/50">
                                        "No matching customers."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || visible.get()
                                key=|c| (c.id.clone(), c.email.clone())
                                children=move |customer| {
                                    let (badge, verified) = if customer.is_verified {
                                        ("badge badge-success", "Yes")
                                    } else {
                                        ("badge badge-ghost", "No")
                                    };
                                    view! {
                                        <tr>
                                            <td class="font-medium">{customer.full_name}</td>
                                            <td>{customer.email}</td>
                                            <td class="hidden md:table-cell">
                                                {customer.phone_number.unwrap_or_else(|| "-".to_string())}
                                            </td>
                                            <td><span class=badge>{verified}</span></td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}
