//! The demo dashboard: seven small examples on one page.
//!
//! Everything here is static configuration except `update_output`, the one
//! callback, which echoes the text field and the click count of the submit
//! button into the output container.

use serde_json::{Value, json};

use crate::app::{App, AppError};
use crate::graph::CallbackError;
use crate::tree::TreeSpec;

const BACKGROUND: &str = "#5f6670";
const HEADING: &str = "#ff69b4";
const TEXT: &str = "white";

const MARKDOWN_TEXT: &str = "
# Heading 1

## Heading 2

### Heading 3
 
All work and no play make Jack a dull boy. All work and no play make Jack a dull boy. 
All work and no play make Jack a dull boy. All work and no play make Jack a dull boy. 
All work and no play make Jack a dull boy. All work and no play make Jack a dull boy. 

*All work and no play make Jack a dull boy.* 

All work and no play make Jack a dull boy. 

All work and no play make Jack a dull boy. 
 
**All work and no play make Jack a dull boy.**

* All work and no play make Jack a dull boy. 
    * All work and no play make Jack a dull boy. 
        * All work and no play make Jack a dull boy. 
* All work and no play make Jack a dull boy. 
        
1. All work and no play make Jack a dull boy. 
2. All work and no play make Jack a dull boy. 
    1. All work and no play make Jack a dull boy. 
    2. All work and no play make Jack a dull boy. 
        1. All work and no play make Jack a dull boy. 
    3. All work and no play make Jack a dull boy. 
3. All work and no play make Jack a dull boy. 
";

/// Build the demo app with its callback registered.
///
/// # Errors
///
/// Only fails if the static layout or callback wiring is invalid.
pub fn app() -> Result<App, AppError> {
    let mut app = App::new(&layout())?;
    app.callback(
        "output_container_button.children",
        &["button.n_clicks"],
        &["user_input.value"],
        update_output,
    )?;
    Ok(app)
}

/// `button.n_clicks` (input) + `user_input.value` (state) → output text.
///
/// # Errors
///
/// Fails if either value list is empty.
pub fn update_output(inputs: &[Value], state: &[Value]) -> Result<Value, CallbackError> {
    let n_clicks = inputs
        .first()
        .ok_or_else(|| CallbackError::new("missing n_clicks input"))?;
    let value = state
        .first()
        .ok_or_else(|| CallbackError::new("missing user_input state"))?;
    Ok(Value::String(format!(
        "The input value was \"{}\" and the button has been clicked {} times",
        display(value),
        display(n_clicks)
    )))
}

/// Strings print bare, `null` prints as `None`, everything else as JSON.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

#[must_use]
pub fn layout() -> TreeSpec {
    TreeSpec::new("container")
        .id("dashboard")
        .prop("style", json!({"backgroundColor": BACKGROUND}))
        .children(histogram())
        .children(scatter())
        .children(markdown())
        .children(selectors())
        .children(side_by_side())
        .children(user_input())
        .children(input_with_button())
}

fn heading(tag: &str, text: &str) -> TreeSpec {
    TreeSpec::new("text")
        .prop("tag", tag)
        .prop("children", text)
        .prop("style", json!({"textAlign": "left", "color": HEADING, "margin": "1em 0 0 1em"}))
}

fn subheading(text: &str) -> TreeSpec {
    TreeSpec::new("text")
        .prop("tag", "h3")
        .prop("children", text)
        .prop("style", json!({"margin": "1em 0 0 1em"}))
}

fn cities() -> Value {
    json!([
        {"label": "New York City", "value": "NYC"},
        {"label": "Montreal", "value": "MTL"},
        {"label": "San Francisco", "value": "SF"}
    ])
}

fn cities_accented() -> Value {
    json!([
        {"label": "New York City", "value": "NYC"},
        {"label": "Montréal", "value": "MTL"},
        {"label": "San Francisco", "value": "SF"}
    ])
}

fn control(kind: &str) -> TreeSpec {
    TreeSpec::new("input-control").prop("control", kind)
}

fn histogram() -> Vec<TreeSpec> {
    vec![
        heading("h1", "EXAMPLE 1"),
        heading("h2", "Plot a histogram using dash_core_components.graph()"),
        TreeSpec::new("graph").id("Graph1").prop(
            "figure",
            json!({
                "data": [
                    {"x": [1, 2, 3], "y": [4, 1, 2], "type": "bar", "name": "SF"},
                    {"x": [1, 2, 3], "y": [2, 4, 5], "type": "bar", "name": "Montreal"}
                ],
                "layout": {
                    "plot_bgcolor": BACKGROUND,
                    "paper_bgcolor": BACKGROUND,
                    "font": {"color": TEXT}
                }
            }),
        ),
    ]
}

/// The series of this chart come from a remote table; only the axes ship here.
fn scatter() -> Vec<TreeSpec> {
    vec![
        heading("h1", "EXAMPLE 2"),
        heading("h2", "Plot a scatterplot using plotly.graph_objs.Scatter()"),
        TreeSpec::new("graph").id("life-exp-vs-gdp").prop(
            "figure",
            json!({
                "data": [],
                "layout": {
                    "xaxis": {"type": "log", "title": "GDP Per Capita"},
                    "yaxis": {"title": "Life Expectancy"},
                    "margin": {"l": 40, "b": 40, "t": 10, "r": 10},
                    "legend": {"x": 0, "y": 1},
                    "hovermode": "closest"
                }
            }),
        ),
    ]
}

fn markdown() -> Vec<TreeSpec> {
    vec![
        heading("h1", "EXAMPLE 3"),
        heading("h2", "Markdowns"),
        TreeSpec::new("markdown").prop("children", MARKDOWN_TEXT),
    ]
}

fn selectors() -> Vec<TreeSpec> {
    let inline = json!({"width": "25%", "display": "inline-block", "margin": "1em 0 1em 1em"});
    vec![
        heading("h1", "EXAMPLE 4"),
        heading("h2", "Dropdown menus and radio buttons"),
        subheading("Dropdown menu"),
        TreeSpec::new("container")
            .prop("style", inline.clone())
            .child(control("dropdown").prop("options", cities()).prop("value", "SF")),
        subheading("Multi-select dropdown menu"),
        TreeSpec::new("container").prop("style", inline).child(
            control("dropdown")
                .prop("options", cities())
                .prop("value", json!(["NYC", "SF"]))
                .prop("multi", true),
        ),
        subheading("Radio buttons"),
        TreeSpec::new("container").child(control("radio").prop("options", cities()).prop("value", "SF")),
        subheading("Checkboxes"),
        control("checklist")
            .prop("options", cities_accented())
            .prop("value", json!(["NYC", "SF"])),
    ]
}

fn side_by_side() -> Vec<TreeSpec> {
    let cell = json!({"width": "50%", "display": "table-cell"});
    let centered = json!({"color": TEXT, "textAlign": "center"});
    vec![
        heading("h1", "EXAMPLE 5"),
        heading("h2", "Aligning divs side by side"),
        TreeSpec::new("container")
            .prop("style", json!({"width": "80%", "display": "table"}))
            .child(
                TreeSpec::new("container")
                    .prop("style", cell.clone())
                    .child(
                        TreeSpec::new("text")
                            .prop("tag", "h3")
                            .prop("children", "Radio buttons")
                            .prop("style", centered.clone()),
                    )
                    .child(control("radio").prop("options", cities()).prop("value", "SF")),
            )
            .child(
                TreeSpec::new("container")
                    .prop("style", cell)
                    .child(
                        TreeSpec::new("text")
                            .prop("tag", "h3")
                            .prop("children", "Checkboxes")
                            .prop("style", centered),
                    )
                    .child(
                        control("checklist")
                            .prop("options", cities_accented())
                            .prop("value", json!(["NYC", "SF"])),
                    ),
            ),
    ]
}

fn user_input() -> Vec<TreeSpec> {
    vec![
        heading("h1", "EXAMPLE 6"),
        heading("h2", "User input"),
        TreeSpec::new("text").prop("tag", "label").prop("children", "Song or band: "),
        control("input").prop("type", "text").prop("value", "Guns 'n Roses"),
    ]
}

fn input_with_button() -> Vec<TreeSpec> {
    vec![
        heading("h1", "EXAMPLE 7"),
        heading("h2", "User input plus button"),
        TreeSpec::new("container")
            .prop("style", json!({"width": "100%", "display": "float", "textAlign": "center"}))
            .child(
                control("input")
                    .id("user_input")
                    .prop("type", "text")
                    .prop("placeholder", "Song/band")
                    .prop("style", json!({"width": "25%"})),
            )
            .child(
                TreeSpec::new("button")
                    .id("button")
                    .prop("children", "Submit")
                    .prop("style", json!({"margin": "0 0 0 1em"})),
            )
            .child(
                TreeSpec::new("container")
                    .id("output_container_button")
                    .prop("children", "Click submit!")
                    .prop("style", json!({"color": TEXT, "margin": "1em 0 0 0"})),
            ),
    ]
}

#[cfg(test)]
#[path = "demo_test.rs"]
mod tests;
