// src/sessions.rs

use std::sync::{Arc, Weak};
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::form::ProductForm;
use crate::models::SelectedProduct;
use crate::services::CategoryLookup;

/// Jeden zamontowany formularz. Żyje, dopóki rodzic go nie zamknie
/// albo nie wygaśnie z powodu bezczynności.
pub struct FormSession {
    form: Mutex<ProductForm>,
    cancel: CancellationToken,
}

impl FormSession {
    pub async fn form(&self) -> MutexGuard<'_, ProductForm> {
        self.form.lock().await
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Rejestr otwartych formularzy, kluczowany UUID sesji.
#[derive(Clone)]
pub struct FormSessions {
    sessions: Cache<Uuid, Arc<FormSession>>,
}

impl FormSessions {
    pub fn new(idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(idle_timeout)
            .eviction_listener(|id, session: Arc<FormSession>, cause| {
                tracing::debug!("Zamknięto formularz {} ({:?})", id, cause);
                session.cancel.cancel();
            })
            .build();
        FormSessions { sessions }
    }

    /// Montuje formularz i w tle zleca jednorazowe pobranie kategorii.
    /// Zadanie jest anulowane razem z sesją; spóźniony wynik jest porzucany.
    pub async fn mount(
        &self,
        selected: SelectedProduct,
        lookup: Arc<dyn CategoryLookup>,
    ) -> (Uuid, Arc<FormSession>) {
        let id = Uuid::new_v4();
        let mut form = ProductForm::mount(selected);
        let load_requested = form.begin_category_load();

        let session = Arc::new(FormSession {
            form: Mutex::new(form),
            cancel: CancellationToken::new(),
        });
        self.sessions.insert(id, session.clone()).await;

        if load_requested {
            spawn_category_load(id, Arc::downgrade(&session), session.cancel.clone(), lookup);
        }

        tracing::info!("Otwarto formularz {}", id);
        (id, session)
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<FormSession>> {
        self.sessions.get(id).await
    }

    pub async fn dispose(&self, id: &Uuid) -> Option<Arc<FormSession>> {
        let session = self.sessions.remove(id).await?;
        session.cancel.cancel();
        Some(session)
    }
}

fn spawn_category_load(
    id: Uuid,
    session: Weak<FormSession>,
    cancel: CancellationToken,
    lookup: Arc<dyn CategoryLookup>,
) {
    tokio::spawn(async move {
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Anulowano ładowanie kategorii dla formularza {}", id);
                return;
            }
            result = lookup.fetch_all() => result,
        };

        let Some(session) = session.upgrade() else {
            return;
        };
        let mut form = session.form.lock().await;
        if cancel.is_cancelled() {
            tracing::debug!("Formularz {} zamknięty przed końcem ładowania kategorii", id);
            return;
        }
        form.apply_categories(result);
    });
}
