mod health_check;
mod helpers;
mod send_emails;
