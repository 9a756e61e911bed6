use js_sys::Function;
use wasm_bindgen::prelude::*;

pub mod counter;
pub mod deck;
pub mod game;
pub mod hand;
mod logging;
pub mod table;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logging::parse_level(level).map_err(|err| JsValue::from_str(&err))?;
    logging::init(filter);
    Ok(())
}

#[wasm_bindgen(js_name = scoreHand)]
pub fn score_hand(ranks: Vec<u8>, scoring: &JsValue) -> Result<u32, JsValue> {
    let scoring: hand::Scoring = if scoring.is_undefined() || scoring.is_null() {
        hand::Scoring::default()
    } else {
        serde_wasm_bindgen::from_value(scoring.clone())
            .map_err(|err| JsValue::from_str(&format!("Invalid scoring: {err}")))?
    };
    let cards = ranks
        .into_iter()
        .map(deck::Card::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| JsValue::from_str(&format!("Invalid hand: {err}")))?;
    Ok(hand::score(&cards, scoring))
}

/// A table driven by the page's Hit, Stick and Reset buttons.
#[wasm_bindgen]
pub struct BlackjackTable {
    table: table::Table,
    listener: Option<Function>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(params: &JsValue) -> Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let input: table::TableInput = if params.is_undefined() || params.is_null() {
            table::TableInput::default()
        } else {
            serde_wasm_bindgen::from_value(params.clone())
                .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?
        };

        let table = table::Table::new(input)
            .map_err(|err| JsValue::from_str(&format!("Deal failed: {err}")))?;

        Ok(BlackjackTable {
            table,
            listener: None,
        })
    }

    pub fn hit(&mut self) -> Result<JsValue, JsValue> {
        self.table
            .hit()
            .map_err(|err| JsValue::from_str(&format!("Hit failed: {err}")))?;
        self.publish()
    }

    pub fn stick(&mut self) -> Result<JsValue, JsValue> {
        self.table
            .stick()
            .map_err(|err| JsValue::from_str(&format!("Stick failed: {err}")))?;
        self.publish()
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.table
            .reset()
            .map_err(|err| JsValue::from_str(&format!("Reset failed: {err}")))?;
        self.publish()
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.table.view())
            .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
    }

    /// Registers a callback that receives the view after every action.
    pub fn subscribe(&mut self, callback: Function) {
        self.listener = Some(callback);
    }
}

impl BlackjackTable {
    fn publish(&self) -> Result<JsValue, JsValue> {
        let view = self.view()?;
        if let Some(listener) = &self.listener {
            let _ = listener.call1(&JsValue::NULL, &view);
        }
        Ok(view)
    }
}
