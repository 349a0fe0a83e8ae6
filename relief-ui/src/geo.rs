use js_sys::Reflect;
use relief_core::report::GEOLOCATION_TIMEOUT_MS;
use relief_core::Coordinates;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::PositionOptions;

pub const UNSUPPORTED: &str = "Geolocation is not supported by your browser";

fn number(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key)).ok()?.as_f64()
}

fn position_to_coordinates(position: &JsValue) -> Option<Coordinates> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).ok()?;
    Coordinates::from_pair(number(&coords, "latitude"), number(&coords, "longitude"))
}

/// One high-accuracy fix. `done` runs exactly once, with the fix or the reason
/// there is none.
pub fn current_position(done: impl FnOnce(Result<Coordinates, String>) + 'static) {
    let done = Rc::new(RefCell::new(Some(done)));
    let finish = move |result: Result<Coordinates, String>| {
        if let Some(done) = done.borrow_mut().take() {
            done(result);
        }
    };

    let geolocation = match web_sys::window()
        .ok_or_else(|| JsValue::from_str("window not available"))
        .and_then(|w| w.navigator().geolocation())
    {
        Ok(g) => g,
        Err(_) => return finish(Err(UNSUPPORTED.into())),
    };

    let on_fix = finish.clone();
    let success = Closure::once_into_js(move |position: JsValue| {
        on_fix(
            position_to_coordinates(&position)
                .ok_or_else(|| "Location reading was incomplete".to_string()),
        );
    });
    let on_fail = finish.clone();
    let failure = Closure::once_into_js(move |err: JsValue| {
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| "unknown error".into());
        on_fail(Err(format!("Unable to retrieve your location: {message}")));
    });

    let options = PositionOptions::new();
    options.set_enable_high_accuracy(true);
    options.set_timeout(GEOLOCATION_TIMEOUT_MS);
    options.set_maximum_age(0);

    if let Err(e) = geolocation.get_current_position_with_error_callback_and_options(
        success.unchecked_ref(),
        Some(failure.unchecked_ref()),
        &options,
    ) {
        finish(Err(format!("Unable to retrieve your location: {e:?}")));
    }
}
