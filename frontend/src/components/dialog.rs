use leptos::prelude::*;

/// 表单模态框
///
/// `open` 控制显示；提交时调用 `on_submit`，是否关闭由调用方在请求成功后决定。
#[component]
pub fn FormDialog(
    open: RwSignal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_submit: Callback<()>,
    children: Children,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        on_submit.run(());
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">{move || title.get()}</h3>
                <form on:submit=submit class="space-y-4 pt-4">
                    {children()}
                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| open.set(false)>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                            <Show when=move || busy.get()>
                                <span class="loading loading-spinner"></span>
                            </Show>
                            "Save"
                        </button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}

/// 删除按钮，点击后需要再确认一次
#[component]
pub fn DeleteButton(
    #[prop(into)] on_confirm: Callback<()>,
    #[prop(into)] busy: Signal<bool>,
) -> impl IntoView {
    let confirming = RwSignal::new(false);

    view! {
        <Show
            when=move || confirming.get()
            fallback=move || {
                view! {
                    <button class="btn btn-ghost btn-xs text-error" on:click=move |_| confirming.set(true)>
                        "Delete"
                    </button>
                }
            }
        >
            <span class="text-xs mr-1">"Are you sure?"</span>
            <button
                class="btn btn-error btn-xs"
                disabled=move || busy.get()
                on:click=move |_| {
                    confirming.set(false);
                    on_confirm.run(());
                }
            >
                "Yes"
            </button>
            <button class="btn btn-ghost btn-xs" on:click=move |_| confirming.set(false)>
                "No"
            </button>
        </Show>
    }
}

/// 文本输入框
#[component]
pub fn TextField(
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(optional, into)] kind: Option<String>,
    #[prop(optional)] required: bool,
    #[prop(optional, into)] placeholder: String,
) -> impl IntoView {
    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">{label}</span>
            </div>
            <input
                type=kind.unwrap_or_else(|| "text".to_string())
                required=required
                placeholder=placeholder
                class="input input-bordered w-full"
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}
