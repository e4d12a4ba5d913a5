use crate::models::{Category, Specialist};

pub const GUARD_NAME: &str = "Guardrail check";
pub const GUARD_INSTRUCTIONS: &str = "Check if the user is asking about travel-related services \
(Hotels, Transport, Food, etc.). If yes, set is_travel_question=True, else False. \
Also give a reasoning.";

pub const TRIAGE_NAME: &str = "Triage Agent";
pub const TRIAGE_INSTRUCTIONS: &str = "Decide which category the question belongs to: \
'Hotels', 'Transport', or 'Food'. Respond ONLY with the category name.";

pub const HOTEL_SPECIALIST: Specialist = Specialist {
    category: Category::Hotels,
    name: "Hotel Representative",
    handoff_description: "Hotel Representative",
    instructions: "Help with Hotel queries, explain each step clearly.",
};

pub const TRANSPORT_SPECIALIST: Specialist = Specialist {
    category: Category::Transport,
    name: "Transport Representative",
    handoff_description: "Transport Representative",
    instructions: "Help with Transport queries, provide context and step-by-step guidance.",
};

pub const FOOD_SPECIALIST: Specialist = Specialist {
    category: Category::Food,
    name: "Food Representative",
    handoff_description: "Food Representative",
    instructions: "Help with Food queries, give detailed and clear answers.",
};

pub fn specialist_for(category: Category) -> &'static Specialist {
    match category {
        Category::Hotels => &HOTEL_SPECIALIST,
        Category::Transport => &TRANSPORT_SPECIALIST,
        Category::Food => &FOOD_SPECIALIST,
    }
}
