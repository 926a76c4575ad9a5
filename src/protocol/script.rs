//! UIAutomation script expression builder.
//!
//! All script text sent to the automation process is built here, so escaping
//! rules live in one place instead of being scattered through the gateway.
//! The dialect is Apple's UIAutomation JavaScript: a shared script context
//! with a `wd_frame` frame variable and an `elements` map holding live
//! element references.

// ============================================================================
// Constants
// ============================================================================

/// Script variable holding the current frame context.
pub const FRAME_VAR: &str = "wd_frame";

/// Script expression for the main application window.
pub const MAIN_WINDOW: &str = "mainWindow";

/// Statement that tells the automation bootstrap loop to exit.
pub const STOP_RUN_LOOP: &str = "runLoop=false;";

// ============================================================================
// String Escaping
// ============================================================================

/// Escapes a string into a double-quoted script literal.
///
/// JSON string syntax is a subset of JavaScript string syntax, so the JSON
/// encoder covers quotes, backslashes and control characters. Interpolating
/// the result never terminates the surrounding statement early.
#[must_use]
pub fn string_literal(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

// ============================================================================
// Element Queries
// ============================================================================

/// Resolves a UI element type tag to its frame query expression.
///
/// Returns `None` for unrecognized tags.
#[must_use]
pub fn element_query(element_type: &str) -> Option<&'static str> {
    match element_type {
        "button" => Some("buttons()"),
        "textField" => Some("textFields()"),
        "secureTextField" => Some("secureTextFields()"),
        "staticText" => Some("staticTexts()"),
        "image" => Some("images()"),
        _ => None,
    }
}

/// Builds the element count query for a frame query.
///
/// Example: `wd_frame.buttons().length`
#[must_use]
pub fn count_query(query: &str) -> String {
    format!("{FRAME_VAR}.{query}.length")
}

/// Builds the expression selecting one element out of a frame query.
///
/// Example: `wd_frame.buttons()[2]`
#[must_use]
pub fn indexed_query(query: &str, index: usize) -> String {
    format!("{FRAME_VAR}.{query}[{index}]")
}

/// Builds the statement assigning an element expression to a handle variable.
///
/// Example: `elements['wde3'] = wd_frame.buttons()[2];`
#[must_use]
pub fn assign_element(handle: &str, expression: &str) -> String {
    format!("elements['{handle}'] = {expression};")
}

/// Builds the accessor expression for a bound handle variable.
///
/// Example: `elements['wde3']`
#[must_use]
pub fn element_accessor(handle: &str) -> String {
    format!("elements['{handle}']")
}

// ============================================================================
// Element Actions
// ============================================================================

/// Builds a tap statement for an element accessor.
#[must_use]
pub fn tap(accessor: &str) -> String {
    format!("{accessor}.tap();")
}

/// Builds a value read for an element accessor.
#[must_use]
pub fn value_of(accessor: &str) -> String {
    format!("{accessor}.value();")
}

/// Builds an attribute read for an element accessor.
///
/// UIAutomation exposes a small fixed set of attribute getters; anything
/// unrecognized reads the element name, matching what WebDriver clients
/// poking at native elements get from the original bridge.
#[must_use]
pub fn attribute_of(accessor: &str, attribute: &str) -> String {
    let getter = match attribute {
        "label" => "label()",
        "value" => "value()",
        _ => "name()",
    };
    format!("{accessor}.{getter};")
}

/// Builds a setValue statement with the text escaped as a literal.
#[must_use]
pub fn set_value(accessor: &str, text: &str) -> String {
    format!("{accessor}.setValue({});", string_literal(text))
}

/// Builds a scroll-to-visible statement for an element accessor.
#[must_use]
pub fn scroll_to_visible(accessor: &str) -> String {
    format!("{accessor}.scrollToVisible();")
}

// ============================================================================
// Frame & Misc Statements
// ============================================================================

/// Builds the frame switch statement.
///
/// `None` switches back to the main application window.
#[must_use]
pub fn switch_frame(frame: Option<&str>) -> String {
    match frame {
        Some(expr) => format!("{FRAME_VAR} = {expr}"),
        None => format!("{FRAME_VAR} = {MAIN_WINDOW}"),
    }
}

/// Builds a delay statement.
#[must_use]
pub fn delay(seconds: u64) -> String {
    format!("delay({seconds});")
}

// ============================================================================
// Batch Sentinels
// ============================================================================

/// Returns the sentinel marker payload for a batched command position.
#[must_use]
pub fn sentinel_marker(position: usize) -> String {
    format!("end batched automation command {position}")
}

/// Returns the sentinel statement inserted after a batched command.
///
/// A bare string-expression statement; the automation engine echoes its
/// value back as a response unit, which is what lets the batch recorder
/// demultiplex the combined result.
#[must_use]
pub fn sentinel_statement(position: usize) -> String {
    format!("\"{}\";", sentinel_marker(position))
}

// ============================================================================
// Tests
// ============================================================================
