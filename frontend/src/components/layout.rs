use crate::auth::{logout, use_auth};
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use martdesk_shared::AppRoute;

const NAV_ITEMS: [AppRoute; 7] = [
    AppRoute::Dashboard,
    AppRoute::Orders,
    AppRoute::Products,
    AppRoute::Categories,
    AppRoute::SubCategories,
    AppRoute::Coupons,
    AppRoute::Users,
];

/// 登录后页面的外壳：侧边栏 + 顶栏 + 内容区
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let on_logout = move |_| logout(&auth);

    let user_email = move || {
        auth.user
            .get()
            .map(|u| u.email)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "Signed in".to_string())
    };

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200 font-sans">
            <input id="nav-drawer" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content flex flex-col">
                <div class="navbar bg-base-100 shadow-sm px-4">
                    <div class="flex-none lg:hidden">
                        <label for="nav-drawer" class="btn btn-square btn-ghost">"☰"</label>
                    </div>
                    <div class="flex-1">
                        <span class="text-xl font-semibold">
                            {move || router.current_route().get().title()}
                        </span>
                    </div>
                    <div class="flex-none gap-2">
                        <span class="badge badge-neutral hidden md:inline-flex">{user_email}</span>
                        <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
                            "Sign Out"
                        </button>
                    </div>
                </div>
                <main class="p-4 md:p-8 max-w-7xl w-full mx-auto space-y-8">{children()}</main>
            </div>
            <div class="drawer-side">
                <label for="nav-drawer" class="drawer-overlay"></label>
                <aside class="bg-base-100 w-64 min-h-full">
                    <div class="p-6 text-2xl font-bold text-primary">"MartDesk"</div>
                    <ul class="menu p-4 gap-1">
                        {NAV_ITEMS
                            .into_iter()
                            .map(|item| {
                                let class = Signal::derive(move || {
                                    if router.current_route().get() == item {
                                        "active".to_string()
                                    } else {
                                        String::new()
                                    }
                                });
                                view! {
                                    <li>
                                        <Link to=item class=class>
                                            {item.title()}
                                        </Link>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </aside>
            </div>
        </div>
    }
}
