//! Notification dispatch. Sending is fire-and-forget from the request path:
//! `Mailer::send` never blocks and transport failures never reach the
//! caller, but every failure is logged so it stays observable. On the native
//! target delivery runs on a bounded queue drained by a small worker pool;
//! in the wasm component messages land in a capped KV outbox instead.

use serde::{Deserialize, Serialize};

use crate::config::{self, MAIL_OUTBOX_KEY};
use crate::core::store::KeyValue;
use crate::models::models::User;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MailMessage {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub text_body: String,
    pub html_body: String,
}

pub trait Mailer {
    /// Enqueues the message for delivery without blocking the caller.
    fn send(&self, message: MailMessage);
}

/// Queues messages in the KV store for out-of-band delivery. The outbox is
/// capped; once full, new messages are dropped with an error log rather
/// than blocking the request.
pub struct OutboxMailer<S: KeyValue> {
    store: S,
    capacity: usize,
}

impl<S: KeyValue> OutboxMailer<S> {
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, config::mail_queue_capacity())
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }
}

impl<S: KeyValue> Mailer for OutboxMailer<S> {
    fn send(&self, message: MailMessage) {
        let mut outbox: Vec<MailMessage> = match self.store.get_json(MAIL_OUTBOX_KEY) {
            Ok(queued) => queued.unwrap_or_default(),
            Err(err) => {
                tracing::error!(error = %err, "failed to read mail outbox, dropping message");
                return;
            }
        };

        if outbox.len() >= self.capacity {
            tracing::error!(subject = %message.subject, "mail outbox full, dropping message");
            return;
        }

        outbox.push(message);
        if let Err(err) = self.store.set_json(MAIL_OUTBOX_KEY, &outbox) {
            tracing::error!(error = %err, "failed to write mail outbox, message lost");
        }
    }
}

pub fn send_password_reset_email(mailer: &dyn Mailer, user: &User, token: &str) {
    let sender = config::admins()
        .into_iter()
        .next()
        .unwrap_or_else(|| "no-reply@localhost".to_string());

    let text_body = format!(
        "Dear {},\n\n\
         To reset your password visit the following link:\n\n\
         /reset_password/{}\n\n\
         If you have not requested a password reset simply ignore this message.\n\n\
         Sincerely,\n\nThe Acorn Team",
        user.username, token
    );
    let html_body = format!(
        "<p>Dear {},</p>\
         <p>To reset your password <a href=\"/reset_password/{}\">click here</a>.</p>\
         <p>If you have not requested a password reset simply ignore this message.</p>\
         <p>Sincerely,</p><p>The Acorn Team</p>",
        user.username, token
    );

    mailer.send(MailMessage {
        subject: "[Acorn] Reset Your Password".to_string(),
        sender,
        recipients: vec![user.email.clone()],
        text_body,
        html_body,
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub mod delivery {
    //! Background delivery for the native server: a bounded channel feeding
    //! a worker pool, with bounded retry before a message is abandoned.

    use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use super::{MailMessage, Mailer};
    use crate::config;

    const DELIVERY_ATTEMPTS: usize = 3;
    const RETRY_BACKOFF: Duration = Duration::from_secs(5);

    pub trait Transport: Send + Sync {
        fn deliver(&self, message: &MailMessage) -> anyhow::Result<()>;
    }

    pub struct QueueMailer {
        tx: SyncSender<MailMessage>,
    }

    impl QueueMailer {
        pub fn start(transport: Arc<dyn Transport>, capacity: usize, workers: usize) -> Self {
            let (tx, rx) = sync_channel::<MailMessage>(capacity);
            let rx = Arc::new(Mutex::new(rx));
            for _ in 0..workers.max(1) {
                let rx = Arc::clone(&rx);
                let transport = Arc::clone(&transport);
                thread::spawn(move || worker_loop(rx, transport));
            }
            QueueMailer { tx }
        }
    }

    impl Mailer for QueueMailer {
        fn send(&self, message: MailMessage) {
            match self.tx.try_send(message) {
                Ok(()) => {}
                Err(TrySendError::Full(dropped)) => {
                    tracing::error!(subject = %dropped.subject, "mail queue full, dropping message");
                }
                Err(TrySendError::Disconnected(dropped)) => {
                    tracing::error!(subject = %dropped.subject, "mail workers stopped, dropping message");
                }
            }
        }
    }

    fn worker_loop(rx: Arc<Mutex<Receiver<MailMessage>>>, transport: Arc<dyn Transport>) {
        loop {
            let message = {
                let rx = rx.lock().expect("mail queue lock poisoned");
                match rx.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                }
            };

            let mut attempt = 1;
            loop {
                match transport.deliver(&message) {
                    Ok(()) => {
                        tracing::info!(subject = %message.subject, "mail delivered");
                        break;
                    }
                    Err(err) if attempt < DELIVERY_ATTEMPTS => {
                        tracing::warn!(
                            subject = %message.subject,
                            attempt,
                            error = %err,
                            "mail delivery failed, retrying"
                        );
                        attempt += 1;
                        thread::sleep(RETRY_BACKOFF);
                    }
                    Err(err) => {
                        tracing::error!(
                            subject = %message.subject,
                            error = %err,
                            "mail delivery failed, giving up"
                        );
                        break;
                    }
                }
            }
        }
    }

    /// SMTP delivery configured from the MAIL_* environment variables.
    pub struct SmtpMailTransport {
        host: String,
        port: u16,
        use_tls: bool,
        username: Option<String>,
        password: Option<String>,
    }

    impl SmtpMailTransport {
        /// `None` when no MAIL_SERVER is configured.
        pub fn from_env() -> Option<Self> {
            config::mail_server().map(|host| Self {
                host,
                port: config::mail_port(),
                use_tls: config::mail_use_tls(),
                username: config::mail_username(),
                password: config::mail_password(),
            })
        }
    }

    impl Transport for SmtpMailTransport {
        fn deliver(&self, message: &MailMessage) -> anyhow::Result<()> {
            use lettre::message::{Mailbox, MultiPart};
            use lettre::transport::smtp::authentication::Credentials;
            use lettre::{Message, SmtpTransport, Transport as _};

            let mut builder = Message::builder()
                .from(message.sender.parse::<Mailbox>()?)
                .subject(message.subject.clone());
            for recipient in &message.recipients {
                builder = builder.to(recipient.parse::<Mailbox>()?);
            }
            let email = builder.multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))?;

            let mut smtp = if self.use_tls {
                SmtpTransport::starttls_relay(&self.host)?
            } else {
                SmtpTransport::builder_dangerous(&self.host)
            };
            smtp = smtp.port(self.port);
            if let (Some(username), Some(password)) = (&self.username, &self.password) {
                smtp = smtp.credentials(Credentials::new(username.clone(), password.clone()));
            }

            smtp.build().send(&email)?;
            Ok(())
        }
    }

    /// Stand-in transport for development runs without a mail server.
    pub struct LogTransport;

    impl Transport for LogTransport {
        fn deliver(&self, message: &MailMessage) -> anyhow::Result<()> {
            tracing::info!(
                subject = %message.subject,
                recipients = ?message.recipients,
                "no mail server configured, logging message instead of sending"
            );
            Ok(())
        }
    }
}
