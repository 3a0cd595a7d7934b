//! Geraete-Token fuer Intercoms
//!
//! Langlebige, signierte Tokens die ein Intercom bei der Registrierung
//! vorzeigt. Format ist ein kompaktes JWT (`header.payload.signatur`,
//! Base64url ohne Padding) mit HMAC-SHA256.
//!
//! Claims: `{deviceId, buildingId, role: "intercom", iat, exp}`

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use vidrom_core::DeviceId;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Einzige Rolle fuer die Geraete-Tokens ausgestellt werden
const TOKEN_ROLLE: &str = "intercom";

/// Ergebnis einer erfolgreichen Verifikation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeraeteIdentitaet {
    pub device_id: DeviceId,
    pub building_id: String,
}

/// Inhalt eines Geraete-Tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceClaims {
    pub device_id: DeviceId,
    pub building_id: String,
    pub role: String,
    /// Ausstellungszeitpunkt (Unix-Sekunden)
    pub iat: i64,
    /// Ablaufzeitpunkt (Unix-Sekunden)
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Prueft ein vorgezeigtes Geraete-Token
///
/// Schnittstelle fuer das Auth-Gate; die Signatur-Implementierung ist
/// austauschbar.
pub trait CredentialVerifier: Send + Sync {
    fn verifizieren(&self, token: &str) -> AuthResult<GeraeteIdentitaet>;
}

/// Stellt Geraete-Tokens aus und verifiziert sie (HS256)
pub struct DeviceTokenService {
    secret: Vec<u8>,
    gueltigkeit: Duration,
}

impl DeviceTokenService {
    /// Erstellt einen neuen Token-Service
    pub fn neu(secret: impl AsRef<[u8]>, gueltigkeit_tage: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            gueltigkeit: Duration::days(gueltigkeit_tage),
        }
    }

    /// Signiert ein Token fuer ein frisch provisioniertes Geraet
    pub fn signieren(&self, device_id: DeviceId, building_id: &str) -> AuthResult<String> {
        let jetzt = Utc::now();
        self.signieren_mit_ablauf(device_id, building_id, jetzt, jetzt + self.gueltigkeit)
    }

    /// Signiert ein Token mit explizitem Ausstellungs- und Ablaufzeitpunkt
    pub fn signieren_mit_ablauf(
        &self,
        device_id: DeviceId,
        building_id: &str,
        ausgestellt: DateTime<Utc>,
        ablauf: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = DeviceClaims {
            device_id,
            building_id: building_id.to_string(),
            role: TOKEN_ROLLE.to_string(),
            iat: ausgestellt.timestamp(),
            exp: ablauf.timestamp(),
        };
        self.claims_signieren(&claims)
    }

    fn claims_signieren(&self, claims: &DeviceClaims) -> AuthResult<String> {
        let header = TokenHeader {
            alg: "HS256".into(),
            typ: "JWT".into(),
        };
        let header_json = serde_json::to_vec(&header).map_err(|e| AuthError::intern(e.to_string()))?;
        let claims_json = serde_json::to_vec(claims).map_err(|e| AuthError::intern(e.to_string()))?;

        let signiert = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signatur = self.mac(signiert.as_bytes())?.finalize().into_bytes();

        Ok(format!("{}.{}", signiert, URL_SAFE_NO_PAD.encode(signatur)))
    }

    /// Verifiziert Format, Algorithmus, Signatur, Rolle und Ablauf
    pub fn claims_pruefen(&self, token: &str) -> AuthResult<DeviceClaims> {
        let mut teile = token.split('.');
        let (header_b64, claims_b64, signatur_b64) =
            match (teile.next(), teile.next(), teile.next(), teile.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err(AuthError::ungueltig("Token muss aus drei Teilen bestehen")),
            };

        let header: TokenHeader = dekodieren_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(AuthError::ungueltig(format!(
                "Algorithmus nicht unterstuetzt: {}",
                header.alg
            )));
        }

        let signatur = URL_SAFE_NO_PAD
            .decode(signatur_b64)
            .map_err(|_| AuthError::ungueltig("Signatur ist kein Base64url"))?;
        let mut mac = self.mac(header_b64.as_bytes())?;
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signatur)
            .map_err(|_| AuthError::ungueltig("Signatur stimmt nicht"))?;

        let claims: DeviceClaims = dekodieren_json(claims_b64)?;
        if claims.role != TOKEN_ROLLE {
            return Err(AuthError::ungueltig(format!("Falsche Rolle: {}", claims.role)));
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenAbgelaufen);
        }

        Ok(claims)
    }

    fn mac(&self, daten: &[u8]) -> AuthResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::intern(format!("HMAC-Schluessel: {e}")))?;
        mac.update(daten);
        Ok(mac)
    }
}

impl CredentialVerifier for DeviceTokenService {
    fn verifizieren(&self, token: &str) -> AuthResult<GeraeteIdentitaet> {
        let claims = self.claims_pruefen(token)?;
        Ok(GeraeteIdentitaet {
            device_id: claims.device_id,
            building_id: claims.building_id,
        })
    }
}

impl std::fmt::Debug for DeviceTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTokenService")
            .field("gueltigkeit", &self.gueltigkeit)
            .finish_non_exhaustive()
    }
}

fn dekodieren_json<T: serde::de::DeserializeOwned>(teil: &str) -> AuthResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(teil)
        .map_err(|_| AuthError::ungueltig("Token-Teil ist kein Base64url"))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::ungueltig(format!("Token-JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> DeviceTokenService {
        DeviceTokenService::neu("test-secret", 365)
    }

    #[test]
    fn signieren_und_verifizieren() {
        let svc = service();
        let device_id = DeviceId::new();
        let token = svc.signieren(device_id, "gebaeude-7").unwrap();

        let identitaet = svc.verifizieren(&token).expect("Token muss gueltig sein");
        assert_eq!(identitaet.device_id, device_id);
        assert_eq!(identitaet.building_id, "gebaeude-7");
    }

    #[test]
    fn claims_enthalten_rolle_und_ablauf() {
        let svc = service();
        let token = svc.signieren(DeviceId::new(), "b1").unwrap();
        let claims = svc.claims_pruefen(&token).unwrap();
        assert_eq!(claims.role, "intercom");
        // 365 Tage Gueltigkeit
        assert_eq!(claims.exp - claims.iat, 365 * 24 * 60 * 60);
    }

    #[test]
    fn anderes_secret_wird_abgelehnt() {
        let token = service().signieren(DeviceId::new(), "b1").unwrap();
        let fremd = DeviceTokenService::neu("anderes-secret", 365);
        assert!(matches!(
            fremd.verifizieren(&token),
            Err(AuthError::TokenUngueltig(_))
        ));
    }

    #[test]
    fn abgelaufenes_token_wird_abgelehnt() {
        let svc = service();
        let vor_zwei_tagen = Utc::now() - Duration::days(2);
        let token = svc
            .signieren_mit_ablauf(DeviceId::new(), "b1", vor_zwei_tagen, vor_zwei_tagen + Duration::days(1))
            .unwrap();
        assert_eq!(svc.verifizieren(&token), Err(AuthError::TokenAbgelaufen));
    }

    #[test]
    fn manipulierte_claims_werden_abgelehnt() {
        let svc = service();
        let token = svc.signieren(DeviceId::new(), "b1").unwrap();
        let teile: Vec<&str> = token.split('.').collect();

        let gefaelscht = DeviceClaims {
            device_id: DeviceId::new(),
            building_id: "b2".into(),
            role: "intercom".into(),
            iat: 0,
            exp: i64::MAX,
        };
        let gefaelscht_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&gefaelscht).unwrap());
        let manipuliert = format!("{}.{}.{}", teile[0], gefaelscht_b64, teile[2]);

        assert!(matches!(
            svc.verifizieren(&manipuliert),
            Err(AuthError::TokenUngueltig(_))
        ));
    }

    #[test]
    fn kaputte_formate_werden_abgelehnt() {
        let svc = service();
        for token in ["", "abc", "a.b", "a.b.c.d", "%%%.%%%.%%%"] {
            let ergebnis = svc.verifizieren(token);
            assert!(
                matches!(ergebnis, Err(AuthError::TokenUngueltig(_))),
                "Token {token:?} haette abgelehnt werden muessen"
            );
        }
    }

    #[test]
    fn falsche_rolle_wird_abgelehnt() {
        let svc = service();
        let claims = DeviceClaims {
            device_id: DeviceId::new(),
            building_id: "b1".into(),
            role: "home".into(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = svc.claims_signieren(&claims).unwrap();
        assert!(matches!(
            svc.verifizieren(&token),
            Err(AuthError::TokenUngueltig(_))
        ));
    }
}
