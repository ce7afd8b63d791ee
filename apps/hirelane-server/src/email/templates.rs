//! Email templates.

use hirelane_storage::ApplicationStatus;

/// Content for an outgoing email.
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl EmailContent {
    /// Password-reset code email.
    pub fn password_reset(code: &str) -> Self {
        Self {
            subject: "Your Hirelane password reset code".to_string(),
            text: format!(
                r#"You asked to reset your Hirelane password.

Your reset code is: {}

This code will expire in 15 minutes.

If you didn't request this code, please ignore this email.

--
The Hirelane Team"#,
                code
            ),
            html: code_html("Reset your password", code),
        }
    }

    /// One-time verification code email.
    pub fn email_otp(code: &str) -> Self {
        Self {
            subject: "Your Hirelane verification code".to_string(),
            text: format!(
                r#"Welcome to Hirelane!

Your verification code is: {}

This code will expire in 15 minutes.

If you didn't request this code, please ignore this email.

--
The Hirelane Team"#,
                code
            ),
            html: code_html("Verify your email", code),
        }
    }

    /// Application status notification sent to the applicant.
    pub fn application_status(
        job_title: &str,
        company_name: &str,
        status: ApplicationStatus,
    ) -> Self {
        let (subject_line, body_line) = match status {
            ApplicationStatus::Shortlisted => (
                format!("You've been shortlisted for {}", job_title),
                format!(
                    "Good news! {} has shortlisted your application for {}. \
                     They may reach out to you with next steps.",
                    company_name, job_title
                ),
            ),
            ApplicationStatus::Rejected => (
                format!("Update on your application for {}", job_title),
                format!(
                    "{} has decided not to move forward with your application for {}. \
                     Keep applying — the right role is out there.",
                    company_name, job_title
                ),
            ),
            ApplicationStatus::Pending => (
                format!("Update on your application for {}", job_title),
                format!(
                    "Your application for {} at {} is back under review.",
                    job_title, company_name
                ),
            ),
        };

        Self {
            subject: subject_line,
            text: format!(
                r#"{}

--
The Hirelane Team"#,
                body_line
            ),
            html: format!(
                r#"<!DOCTYPE html>
<html>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 24px;">
        <p>{}</p>
        <p style="color: #888; font-size: 12px;">The Hirelane Team</p>
    </div>
</body>
</html>"#,
                body_line
            ),
        }
    }
}

fn code_html(heading: &str, code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 24px;">
        <h1 style="font-size: 22px;">{}</h1>
        <p>Your code is:</p>
        <div style="font-size: 32px; font-weight: bold; letter-spacing: 6px; text-align: center; padding: 16px; background: #f0f7ff; border-radius: 8px;">{}</div>
        <p style="color: #666; font-size: 14px; text-align: center;">This code will expire in 15 minutes.</p>
        <p style="color: #888; font-size: 12px;">If you didn't request this code, you can safely ignore this email.</p>
    </div>
</body>
</html>"#,
        heading, code
    )
}
