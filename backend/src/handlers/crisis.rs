use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Helpline {
    pub name: &'static str,
    pub contact: &'static str,
    pub description: &'static str,
    pub country: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BreathingExercise {
    pub phases: [&'static str; 3],
    pub seconds_per_phase: u32,
}

#[derive(Debug, Serialize)]
pub struct CrisisResources {
    pub helplines: &'static [Helpline],
    pub breathing_exercise: BreathingExercise,
}

const HELPLINES: &[Helpline] = &[
    Helpline {
        name: "988 Suicide & Crisis Lifeline",
        contact: "988",
        description: "24/7 crisis support in the US",
        country: "US",
    },
    Helpline {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
        description: "24/7 text-based crisis support",
        country: "US",
    },
    Helpline {
        name: "AASRA",
        contact: "91-9820466726",
        description: "24/7 crisis support in India",
        country: "India",
    },
    Helpline {
        name: "Samaritans",
        contact: "116 123",
        description: "24/7 crisis support in the UK",
        country: "UK",
    },
];

/// Public: reachable without a session so it works even when sign-in fails.
pub async fn resources() -> Json<CrisisResources> {
    Json(CrisisResources {
        helplines: HELPLINES,
        breathing_exercise: BreathingExercise {
            phases: ["inhale", "hold", "exhale"],
            seconds_per_phase: 4,
        },
    })
}
