// notifier/email.rs

use crate::config::{EmailConfig, SmtpCredentials};
use crate::model::{NotifyError, Position, Signal};
use crate::notifier::report::render_report;
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Sends the signal report over SMTPS. TLS is scoped to this transport
/// instance; credentials are injected, never read from the config file.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
    order_budget: f64,
}

impl EmailNotifier {
    pub fn new(
        cfg: &EmailConfig,
        credentials: SmtpCredentials,
        order_budget: f64,
    ) -> Result<Self, NotifyError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)?
            .port(cfg.smtp_port)
            .credentials(Credentials::new(credentials.user, credentials.password))
            .build();

        Ok(Self {
            mailer,
            from: cfg.from.clone(),
            to: cfg.to.clone(),
            order_budget,
        })
    }

    pub async fn send_report(
        &self,
        buy: &[Signal],
        sell: &[Signal],
        positions: &[Position],
    ) -> Result<(), NotifyError> {
        let now = Utc::now();
        let subject = format!("Trading Signals - {}", now.format("%d/%m/%Y %H:%M"));
        let body = render_report(buy, sell, positions, self.order_budget, now);

        let email = Message::builder()
            .from(self.from.parse()?)
            .to(self.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.mailer.send(email).await?;
        info!("📨 Report emailed to {}", self.to);
        Ok(())
    }
}
