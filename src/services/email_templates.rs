// ============================================================================
// TEMPLATES EMAIL
// ============================================================================
//
// Description:
//   Construit les emails envoyés aux patients (texte en hongrois).
//   Les fonctions ne font qu'assembler sujet + HTML; l'envoi passe par
//   le Notifier.
//
// Liste des templates:
//   - magic_link : lien de connexion au portail (24h, usage unique)
//   - appointment_confirmation : rendez-vous réservé
//   - appointment_cancellation : rendez-vous annulé (par le médecin ou le patient)
//   - appointment_modification : rendez-vous déplacé (ancienne + nouvelle date)
//
// ============================================================================

use crate::config::ClinicConfig;
use crate::services::notifier::EmailMessage;

/// Qui a annulé le rendez-vous (change la formulation de l'email)
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Doctor,
    Patient,
}

/// Données du créneau affichées dans les emails
pub struct AppointmentDetails<'a> {
    pub patient_name: &'a str,
    pub date: &'a str,
    pub dentist_name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub room: Option<&'a str>,
}

pub fn magic_link(clinic: &ClinicConfig, to: &str, token: &str) -> EmailMessage {
    let login_url = format!("{}/patient-portal/verify?token={}", clinic.app_url, token);

    let body = format!(
        r#"<h2>Tisztelettel!</h2>
          <p>Kattintson az alábbi gombra a páciens portálba való bejelentkezéshez:</p>
          <div style="text-align: center; margin: 30px 0;">
            <a href="{url}" class="button">Bejelentkezés a páciens portálba</a>
          </div>
          <p>Ha a gomb nem működik, másolja be ezt a linket a böngésző címsorába:</p>
          <p style="word-break: break-all;">{url}</p>
          <div class="warning">
            <p><strong>Figyelem:</strong> Ez a bejelentkezési link 24 órán belül lejár. Csak egyszer használható.</p>
          </div>
          <p>Ha Ön nem kért bejelentkezési linket, kérjük, hagyja figyelmen kívül ezt az emailt.</p>"#,
        url = login_url
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Bejelentkezési link - {}", clinic.name),
        html: layout(clinic, "#2563eb", &body),
        text: None,
    }
}

pub fn appointment_confirmation(
    clinic: &ClinicConfig,
    to: &str,
    details: &AppointmentDetails<'_>,
) -> EmailMessage {
    let body = format!(
        r#"<h2>Tisztelettel {name}!</h2>
          <p>Időpontja sikeresen lefoglalva.</p>
          <div class="info-box">
            <p><strong>Időpont:</strong> {date}</p>
            <p><strong>Orvos:</strong> {dentist}</p>
            <p><strong>Helyszín:</strong> {place}</p>
          </div>
          <p>Kérjük, hogy időben érkezzen az időpontra.</p>
          <p>Ha módosítani vagy lemondani szeretné az időpontot, kérjük, lépjen kapcsolatba velünk.</p>"#,
        name = escape_html(details.patient_name),
        date = escape_html(details.date),
        dentist = escape_html(details.dentist_name.unwrap_or(&clinic.dentist_name)),
        place = escape_html(&place(clinic, details)),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Időpont megerősítése - {}", clinic.name),
        html: layout(clinic, "#2563eb", &body),
        text: None,
    }
}

pub fn appointment_cancellation(
    clinic: &ClinicConfig,
    to: &str,
    patient_name: &str,
    date: &str,
    cancelled_by: CancelledBy,
) -> EmailMessage {
    let cancelled_by_text = match cancelled_by {
        CancelledBy::Doctor => "az orvos",
        CancelledBy::Patient => "Ön",
    };

    let body = format!(
        r#"<h2>Tisztelettel {name}!</h2>
          <p>Az alábbi időpont lemondásra került {by} által:</p>
          <div class="info-box">
            <p><strong>Időpont:</strong> {date}</p>
          </div>
          <p>Ha új időpontot szeretne foglalni, kérjük, lépjen kapcsolatba velünk vagy használja a páciens portált.</p>"#,
        name = escape_html(patient_name),
        by = cancelled_by_text,
        date = escape_html(date),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Időpont lemondva - {}", clinic.name),
        html: layout(clinic, "#dc2626", &body),
        text: None,
    }
}

pub fn appointment_modification(
    clinic: &ClinicConfig,
    to: &str,
    old_date: &str,
    details: &AppointmentDetails<'_>,
) -> EmailMessage {
    let body = format!(
        r#"<h2>Tisztelettel {name}!</h2>
          <p>Időpontja módosításra került.</p>
          <div class="info-box">
            <p><strong>Régi időpont:</strong> {old}</p>
            <p><strong>Új időpont:</strong> {new}</p>
            <p><strong>Orvos:</strong> {dentist}</p>
            <p><strong>Helyszín:</strong> {place}</p>
          </div>
          <p>Kérjük, hogy az új időpontra időben érkezzen.</p>"#,
        name = escape_html(details.patient_name),
        old = escape_html(old_date),
        new = escape_html(details.date),
        dentist = escape_html(details.dentist_name.unwrap_or(&clinic.dentist_name)),
        place = escape_html(&place(clinic, details)),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Időpont módosítva - {}", clinic.name),
        html: layout(clinic, "#f59e0b", &body),
        text: None,
    }
}

fn place(clinic: &ClinicConfig, details: &AppointmentDetails<'_>) -> String {
    let address = details.address.unwrap_or(&clinic.address);
    match details.room.filter(|room| !room.trim().is_empty()) {
        Some(room) => format!("{} ({}. terem)", address, room),
        None => address.to_string(),
    }
}

// Tout texte saisi (nom, dates, adresse) passe par ici avant d'entrer dans le HTML
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(clinic: &ClinicConfig, accent: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: {accent}; color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
    .content {{ background: #f9fafb; padding: 30px; border: 1px solid #e5e7eb; }}
    .info-box {{ background: white; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid {accent}; }}
    .button {{ display: inline-block; background: {accent}; color: white; padding: 14px 28px; text-decoration: none; border-radius: 6px; font-weight: bold; }}
    .warning {{ background: #fef3c7; border-left: 4px solid #f59e0b; padding: 12px; margin: 20px 0; border-radius: 4px; }}
    .footer {{ text-align: center; padding: 20px; color: #6b7280; font-size: 12px; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><h1>{name}</h1></div>
    <div class="content">
          {body}
    </div>
    <div class="footer">
      <p>{name}<br>{address}<br>{dentist}</p>
    </div>
  </div>
</body>
</html>"#,
        accent = accent,
        name = clinic.name,
        body = body,
        address = clinic.address,
        dentist = clinic.dentist_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_link_contains_verify_url() {
        let clinic = ClinicConfig::default();
        let message = magic_link(&clinic, "a@b.hu", "abc123");

        assert_eq!(message.to, "a@b.hu");
        assert!(message.subject.starts_with("Bejelentkezési link"));
        assert!(message
            .html
            .contains("http://localhost:3000/patient-portal/verify?token=abc123"));
    }

    #[test]
    fn test_confirmation_uses_clinic_defaults() {
        let clinic = ClinicConfig::default();
        let details = AppointmentDetails {
            patient_name: "Kiss Anna",
            date: "2026. október 19. 14:00",
            dentist_name: None,
            address: None,
            room: Some("2"),
        };

        let message = appointment_confirmation(&clinic, "a@b.hu", &details);
        assert!(message.html.contains("Tisztelettel Kiss Anna!"));
        assert!(message.html.contains("dr. König János"));
        assert!(message.html.contains("5600 Békéscsaba, Kolozsvári utca 3 (2. terem)"));
    }

    #[test]
    fn test_cancellation_wording() {
        let clinic = ClinicConfig::default();
        let by_doctor = appointment_cancellation(&clinic, "a@b.hu", "X", "d", CancelledBy::Doctor);
        let by_patient = appointment_cancellation(&clinic, "a@b.hu", "X", "d", CancelledBy::Patient);

        assert!(by_doctor.html.contains("az orvos által"));
        assert!(by_patient.html.contains("Ön által"));
    }

    #[test]
    fn test_modification_lists_both_dates() {
        let clinic = ClinicConfig::default();
        let details = AppointmentDetails {
            patient_name: "X",
            date: "NEW",
            dentist_name: Some("dr. Teszt"),
            address: Some("Cím"),
            room: None,
        };

        let message = appointment_modification(&clinic, "a@b.hu", "OLD", &details);
        assert!(message.html.contains("<strong>Régi időpont:</strong> OLD"));
        assert!(message.html.contains("<strong>Új időpont:</strong> NEW"));
        assert!(message.html.contains("<strong>Helyszín:</strong> Cím</p>"));
    }

    #[test]
    fn test_patient_name_is_escaped() {
        let clinic = ClinicConfig::default();
        let details = AppointmentDetails {
            patient_name: "<script>alert(\"x\")</script> & Co",
            date: "2026. október 19. 14:00",
            dentist_name: None,
            address: None,
            room: None,
        };

        let confirmation = appointment_confirmation(&clinic, "a@b.hu", &details);
        assert!(!confirmation.html.contains("<script>"));
        assert!(confirmation
            .html
            .contains("Tisztelettel &lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; Co!"));

        let cancellation =
            appointment_cancellation(&clinic, "a@b.hu", "<b>Kiss</b>", "d", CancelledBy::Patient);
        assert!(cancellation.html.contains("Tisztelettel &lt;b&gt;Kiss&lt;/b&gt;!"));

        let modification = appointment_modification(&clinic, "a@b.hu", "OLD", &details);
        assert!(!modification.html.contains("<script>"));
    }
}
