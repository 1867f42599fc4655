use leptos::prelude::*;
use martdesk_shared::ApiError;

/// 查询失败时的提示条
#[component]
pub fn QueryAlert(error: RwSignal<Option<ApiError>>) -> impl IntoView {
    view! {
        <Show when=move || error.with(Option::is_some)>
            <div role="alert" class="alert alert-error mx-6 my-2">
                <span>
                    {move || error.get().map(|e| e.message().to_string()).unwrap_or_default()}
                </span>
            </div>
        </Show>
    }
}

/// 表格为空时占一整行：加载中显示加载动画，否则显示无数据
#[component]
pub fn EmptyRow(
    colspan: u32,
    #[prop(into)] loading: Signal<bool>,
    #[prop(into)] empty: Signal<bool>,
) -> impl IntoView {
    let colspan = colspan.to_string();

    view! {
        <Show when=move || empty.get()>
            <tr>
                <td colspan=colspan.clone() class="text-center py-8 text-base-content/50">
                    {move || {
                        if loading.get() {
                            view! { <span class="loading loading-spinner loading-md"></span> " Loading..." }
                                .into_any()
                        } else {
                            "No records found.".into_any()
                        }
                    }}
                </td>
            </tr>
        </Show>
    }
}
