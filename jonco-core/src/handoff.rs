//! Outbound messages that end every reservation flow.
//!
//! Nothing is booked by the site itself: the visitor is sent to a chat with
//! the operator, with a pre-composed message describing what they want.

use jonco_common::Itinerary;
use thiserror::Error;

/// Default operator contact details, used until the admin overrides them.
pub mod contact {
    pub const PHONE: &str = "5491140765354";
    pub const EMAIL: &str = "expediciones@jonco.com.ar";
    pub const INSTAGRAM: &str = "joncoexperience";
    pub const LOCATION: &str = "Tigre, Buenos Aires, Argentina";
    pub const COORDINATES: &str = "-34.4267°S, 58.5796°W";
}

/// Chat link that opens a conversation with `phone` pre-filled with `message`.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!("https://wa.me/{phone}?text={}", urlencoding::encode(message))
}

/// Format an amount with `.` as thousands separator and `,` for decimals,
/// dropping the decimals when the amount is whole ("150.000", "1.234,5").
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative && cents > 0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 0 {
        let frac = format!("{frac:02}");
        out.push(',');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

/// Summary of the whole itinerary for the checkout chat.
pub fn itinerary_message(itinerary: &Itinerary) -> String {
    let lines: Vec<String> = itinerary
        .items()
        .iter()
        .map(|i| format!("• *{}* (Cant: {})", i.title, i.quantity))
        .collect();
    format!(
        "Hola Jonco! Estuve armando este itinerario en la web:\n\n{}\n\n*Total estimado:* ARS {}\n\n¿Podemos coordinar la disponibilidad?",
        lines.join("\n"),
        format_amount(itinerary.total_price())
    )
}

/// Booking request for a single experience.
pub fn reservation_message(title: &str, category: &str, price: f64) -> String {
    format!(
        "*RESERVA DE EXPEDICION*\n\n\
         * *Expedicion:* {title}\n\
         * *Categoria:* {category}\n\
         * *Precio:* ${}/pax\n\n\
         -------------------\n\n\
         Hola! Me interesa reservar esta expedicion. Hay disponibilidad para las proximas fechas?",
        format_amount(price)
    )
}

/// Fields of the custom-trip request form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomTripRequest {
    pub destino: String,
    pub fechas: String,
    pub pasajeros: Option<u32>,
    pub presupuesto: Option<u64>,
    pub notas: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CustomTripField {
    #[error("destination is required")]
    Destino,
    #[error("dates are required")]
    Fechas,
    #[error("at least one passenger is required")]
    Pasajeros,
    #[error("a budget of at least 1 is required")]
    Presupuesto,
    #[error("notes are required")]
    Notas,
}

impl CustomTripRequest {
    /// Every invalid field, in form order. Empty when the form can be sent.
    pub fn validate(&self) -> Vec<CustomTripField> {
        let mut errors = Vec::new();
        if self.destino.trim().is_empty() {
            errors.push(CustomTripField::Destino);
        }
        if self.fechas.trim().is_empty() {
            errors.push(CustomTripField::Fechas);
        }
        if self.pasajeros.map_or(true, |p| p < 1) {
            errors.push(CustomTripField::Pasajeros);
        }
        if self.presupuesto.map_or(true, |p| p < 1) {
            errors.push(CustomTripField::Presupuesto);
        }
        if self.notas.trim().is_empty() {
            errors.push(CustomTripField::Notas);
        }
        errors
    }

    /// The chat message for a valid request, or the list of invalid fields.
    pub fn message(&self) -> Result<String, Vec<CustomTripField>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let lines = [
            "*NUEVA SOLICITUD DE EXPEDICIÓN PERSONALIZADA*".to_string(),
            "--------------------------------------".to_string(),
            format!("DESTINO: {}", self.destino.trim()),
            format!("FECHAS: {}", self.fechas.trim()),
            format!("PASAJEROS: {}", self.pasajeros.unwrap_or_default()),
            format!("PRESUPUESTO: U$D {} / pax", self.presupuesto.unwrap_or_default()),
            format!("NOTAS: {}", self.notas.trim()),
        ];
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jonco_common::ExperienceInput;

    #[test]
    fn amounts_use_dot_grouping() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1.000");
        assert_eq!(format_amount(150000.0), "150.000");
        assert_eq!(format_amount(1234567.5), "1.234.567,5");
        assert_eq!(format_amount(12.05), "12,05");
        assert_eq!(format_amount(-2500.0), "-2.500");
    }

    #[test]
    fn link_encodes_message_once() {
        let link = whatsapp_link(contact::PHONE, "Hola Jon!\n¿Hay lugar?");
        assert_eq!(
            link,
            "https://wa.me/5491140765354?text=Hola%20Jon%21%0A%C2%BFHay%20lugar%3F"
        );
    }

    #[test]
    fn itinerary_summary() {
        let mut it = Itinerary::new();
        let delta = ExperienceInput {
            id: "a".into(),
            title: "Delta".into(),
            price: 1000.0,
            image: "x".into(),
            category: None,
        };
        it.add_experience(delta.clone());
        it.add_experience(delta);

        let msg = itinerary_message(&it);
        assert!(msg.starts_with("Hola Jonco!"));
        assert!(msg.contains("• *Delta* (Cant: 2)"));
        assert!(msg.contains("*Total estimado:* ARS 2.000"));
    }

    #[test]
    fn reservation_text() {
        let msg = reservation_message("Kayak Nocturno", "Agua", 45000.0);
        assert!(msg.contains("* *Expedicion:* Kayak Nocturno"));
        assert!(msg.contains("* *Precio:* $45.000/pax"));
    }

    #[test]
    fn custom_trip_requires_every_field() {
        let empty = CustomTripRequest::default();
        assert_eq!(
            empty.validate(),
            vec![
                CustomTripField::Destino,
                CustomTripField::Fechas,
                CustomTripField::Pasajeros,
                CustomTripField::Presupuesto,
                CustomTripField::Notas,
            ]
        );

        let zero_pax = CustomTripRequest {
            destino: "Esteros del Iberá".into(),
            fechas: "Marzo".into(),
            pasajeros: Some(0),
            presupuesto: Some(800),
            notas: "Fotografía".into(),
        };
        assert_eq!(zero_pax.validate(), vec![CustomTripField::Pasajeros]);
    }

    #[test]
    fn custom_trip_message() {
        let req = CustomTripRequest {
            destino: "  Esteros del Iberá ".into(),
            fechas: "Marzo".into(),
            pasajeros: Some(4),
            presupuesto: Some(800),
            notas: "Fotografía de aves".into(),
        };
        let msg = req.message().unwrap();
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines[0], "*NUEVA SOLICITUD DE EXPEDICIÓN PERSONALIZADA*");
        assert_eq!(lines[2], "DESTINO: Esteros del Iberá");
        assert_eq!(lines[4], "PASAJEROS: 4");
        assert_eq!(lines[5], "PRESUPUESTO: U$D 800 / pax");
    }
}
