use serde::{Deserialize, Serialize};

use crate::models::User;

/// Messaggio fra due utenti.
///
/// `R` è il tipo dei riferimenti `from`/`to`: l'id dell'utente quando il messaggio
/// viene salvato, l'utente completo quando viene restituito dagli endpoint di lettura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message<R = String> {
    #[serde(rename = "_id")]
    pub id: String,
    pub from: R,
    pub to: R,
    pub text: String,
}

/// Messaggio con `from`/`to` espansi. `None` se l'utente è stato cancellato dopo
/// la creazione del messaggio (riferimento pendente, serializzato come `null`).
pub type ExpandedMessage = Message<Option<User>>;
