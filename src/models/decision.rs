use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// The operator's verdict on one pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Strict parsing of one line of operator input.
    ///
    /// Only a trailing line terminator is stripped. After lowercasing, exactly
    /// `s` or `si` approves; anything else (empty, `"si "`, `"yes"`) rejects.
    pub fn from_operator_input(line: &str) -> Self {
        let answer = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line)
            .to_lowercase();

        match answer.as_str() {
            "s" | "si" => Decision::Approve,
            _ => Decision::Reject,
        }
    }

    pub fn outcome(self) -> ProcessorOutcome {
        match self {
            Decision::Approve => ProcessorOutcome {
                status: StatusCode::OK,
                body: DecisionBody {
                    estado: "APROBADA".to_string(),
                    codigo: "00".to_string(),
                    mensaje: "Transacción procesada exitosamente".to_string(),
                },
            },
            Decision::Reject => ProcessorOutcome {
                status: StatusCode::BAD_REQUEST,
                body: DecisionBody {
                    estado: "RECHAZADA".to_string(),
                    codigo: "01".to_string(),
                    mensaje: "Transacción rechazada por el procesador".to_string(),
                },
            },
        }
    }
}

/// JSON body returned to the payment caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionBody {
    pub estado: String,
    pub codigo: String,
    pub mensaje: String,
}

/// What a resolved completion handle delivers to the waiting caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorOutcome {
    pub status: StatusCode,
    pub body: DecisionBody,
}

impl IntoResponse for ProcessorOutcome {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
