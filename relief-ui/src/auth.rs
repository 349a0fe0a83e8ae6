//! Bridge to the page's identity provider, exposed as `window.reliefAuth`
//! with `signIn()`, `signOut()` and `onChange(cb, errCb) -> unsubscribe`.

use js_sys::{Function, Promise, Reflect};
use relief_core::session::UserIdentity;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

fn provider() -> Result<JsValue, String> {
    let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;
    let auth = Reflect::get(&window, &JsValue::from_str("reliefAuth"))
        .map_err(|_| "failed to access reliefAuth".to_string())?;
    if auth.is_undefined() || auth.is_null() {
        return Err("auth provider unavailable".into());
    }
    Ok(auth)
}

fn method(auth: &JsValue, name: &str) -> Result<Function, String> {
    let f = Reflect::get(auth, &JsValue::from_str(name))
        .map_err(|_| format!("failed to access reliefAuth.{name}"))?;
    if !f.is_function() {
        return Err(format!("reliefAuth.{name} is not a function"));
    }
    Ok(f.unchecked_into())
}

fn user_from_js(val: JsValue) -> Result<Option<UserIdentity>, String> {
    if val.is_undefined() || val.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(val)
        .map(Some)
        .map_err(|e| e.to_string())
}

async fn call(name: &str) -> Result<JsValue, String> {
    let auth = provider()?;
    let js = method(&auth, name)?
        .call0(&auth)
        .map_err(|e| format!("{name} failed: {e:?}"))?;
    JsFuture::from(Promise::resolve(&js))
        .await
        .map_err(|e| format!("{name} rejected: {e:?}"))
}

pub async fn sign_in() -> Result<UserIdentity, String> {
    user_from_js(call("signIn").await?)?.ok_or_else(|| "sign-in returned no user".to_string())
}

pub async fn sign_out() -> Result<(), String> {
    call("signOut").await.map(|_| ())
}

/// Live auth-state subscription. Dropping it unsubscribes from the provider.
pub struct AuthWatch {
    auth: JsValue,
    unsubscribe: Option<Function>,
    _on_change: Closure<dyn FnMut(JsValue)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl AuthWatch {
    pub fn start(
        changed: impl Fn(Option<UserIdentity>) + 'static,
        on_error: impl Fn(String) + 'static,
    ) -> Result<Self, String> {
        let auth = provider()?;
        let subscribe = method(&auth, "onChange")?;

        let report_error: std::rc::Rc<dyn Fn(String)> = std::rc::Rc::new(on_error);
        let decode_error = report_error.clone();
        let on_change = Closure::<dyn FnMut(JsValue)>::new(move |val: JsValue| {
            match user_from_js(val) {
                Ok(user) => changed(user),
                Err(e) => decode_error(e),
            }
        });
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
            report_error(err.as_string().unwrap_or_else(|| format!("{err:?}")));
        });

        let handle = subscribe
            .call2(&auth, on_change.as_ref(), on_error.as_ref())
            .map_err(|e| format!("onChange failed: {e:?}"))?;
        let unsubscribe = handle
            .is_function()
            .then(|| handle.unchecked_into::<Function>());

        Ok(Self {
            auth,
            unsubscribe,
            _on_change: on_change,
            _on_error: on_error,
        })
    }
}

impl Drop for AuthWatch {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            let _ = unsubscribe.call0(&self.auth);
        }
    }
}
