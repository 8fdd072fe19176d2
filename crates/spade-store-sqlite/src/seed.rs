//! Starter action library.
//!
//! Positive `user_movement` shifts control toward the user; positive
//! `llm_movement` toward the LLM.

use spade_core::library::StarterAction;

const fn starter(description: &'static str, user_movement: i64, llm_movement: i64) -> StarterAction {
  StarterAction { description, user_movement, llm_movement }
}

pub static STARTER_ACTIONS: &[StarterAction] = &[
  // Human advance (net > +2)
  starter("Pushed back on AI's suggestion and steered new direction", 4, -1),
  starter("Attempted my own explanation of a concept before asking AI", 3, 0),
  starter("Fact-checked AI's response before using it", 3, 0),
  starter("Created a draft myself first, then asked AI to review", 4, 0),
  // Balanced (net -2 to +2)
  starter("Put AI's explanation into my own words", 2, 0),
  starter("Asked a specific follow-up question to understand better", 2, 1),
  starter("Asked AI to critique my work", 2, 1),
  starter("Asked AI to quiz me on what I'm learning", 2, 1),
  starter("Worked with AI to learn a new concept", 2, 1),
  starter("Used AI-generated outline as starting point, then adapted", 1, 2),
  // AI advance (net < -2)
  starter("Asked AI to summarize a long document", -1, 2),
  starter("Asked AI to write something from scratch for me", -2, 3),
  starter("Used AI's output without verifying accuracy", -3, 4),
  starter("Copy-pasted AI response without reading it", -3, 4),
];
