// src/services/document_service.rs

use async_trait::async_trait;
use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use std::path::PathBuf;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{acteurs::Citoyen, demande::Demande, territoire::Commune},
};

// Tout ce dont le rendu a besoin, résolu en amont par le moteur du cycle
// de vie : le moteur de rendu ne touche jamais à la base.
#[derive(Debug, Clone)]
pub struct ContexteRendu {
    pub demande: Demande,
    pub citoyen: Citoyen,
    pub commune: Commune,
    pub jeton: Uuid,
    pub signe: bool,
}

/// Le collaborateur externe du cycle de vie : produit les octets du
/// document officiel. Abstrait derrière un trait pour pouvoir brancher un
/// rendu factice dans les tests.
#[async_trait]
pub trait RenduDocument: Send + Sync {
    async fn rendre(&self, contexte: &ContexteRendu) -> Result<Vec<u8>, AppError>;
}

// Le moteur de production : PDF via genpdf, avec le QR code du jeton de
// vérification embarqué.
pub struct PdfRenderer {
    dossier_polices: PathBuf,
}

impl PdfRenderer {
    pub fn new(dossier_polices: PathBuf) -> Self {
        Self { dossier_polices }
    }
}

#[async_trait]
impl RenduDocument for PdfRenderer {
    async fn rendre(&self, contexte: &ContexteRendu) -> Result<Vec<u8>, AppError> {
        let contexte = contexte.clone();
        let dossier_polices = self.dossier_polices.clone();

        // genpdf est entièrement synchrone : tout le rendu part dans une
        // tâche bloquante.
        let octets = tokio::task::spawn_blocking(move || rendre_pdf(&dossier_polices, &contexte))
            .await
            .map_err(|e| anyhow::anyhow!("Échec de la tâche de rendu: {e}"))??;

        Ok(octets)
    }
}

fn rendre_pdf(dossier_polices: &PathBuf, contexte: &ContexteRendu) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(dossier_polices, "Roboto", None).map_err(|e| {
        tracing::error!("Police introuvable dans {dossier_polices:?}: {e}");
        AppError::RenderFailed
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(contexte.demande.type_demande.libelle());
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- EN-TÊTE OFFICIEL ---
    doc.push(
        elements::Paragraph::new("RÉPUBLIQUE DÉMOCRATIQUE DU CONGO")
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Paragraph::new(format!("Commune de {}", contexte.commune.nom)));
    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new(contexte.demande.type_demande.libelle().to_uppercase())
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    doc.push(elements::Break::new(1.5));

    // --- IDENTITÉ DU DEMANDEUR ---
    let nom_complet = crate::models::acteurs::nom_complet(
        &contexte.citoyen.nom,
        &contexte.citoyen.prenom,
        contexte.citoyen.postnom.as_deref(),
    );
    doc.push(elements::Paragraph::new(format!("Titulaire : {nom_complet}")));
    doc.push(elements::Paragraph::new(format!(
        "Numéro unique : {}",
        contexte.citoyen.numero_unique
    )));
    doc.push(elements::Paragraph::new(format!(
        "Né(e) le {} à {}",
        contexte.citoyen.date_naissance.format("%d/%m/%Y"),
        contexte.citoyen.lieu_naissance
    )));
    doc.push(elements::Paragraph::new(format!("Sexe : {}", contexte.citoyen.sexe)));
    doc.push(elements::Break::new(1.5));

    // --- CHAMPS SPÉCIFIQUES DE LA DEMANDE ---
    if let Some(serde_json::Value::Object(champs)) = &contexte.demande.donnees_json {
        let mut table = elements::TableLayout::new(vec![2, 3]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        let style_bold = style::Style::new().bold();

        for (champ, valeur) in champs {
            let valeur = match valeur {
                serde_json::Value::String(s) => s.clone(),
                autre => autre.to_string(),
            };
            table
                .row()
                .element(elements::Paragraph::new(champ.clone()).styled(style_bold))
                .element(elements::Paragraph::new(valeur))
                .push()
                .map_err(|e| {
                    tracing::error!("Erreur de tableau PDF: {e}");
                    AppError::RenderFailed
                })?;
        }
        doc.push(table);
        doc.push(elements::Break::new(1.5));
    }

    // --- QR CODE DE VÉRIFICATION ---
    doc.push(elements::Paragraph::new(format!(
        "Jeton de vérification : {}",
        contexte.jeton
    )));
    let code = QrCode::new(contexte.jeton.to_string().as_bytes()).map_err(|e| {
        tracing::error!("Erreur de génération du QR code: {e}");
        AppError::RenderFailed
    })?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
    let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
        .map_err(|e| {
            tracing::error!("Erreur de conversion du QR code: {e}");
            AppError::RenderFailed
        })?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(pdf_image);

    // --- BLOC DE SIGNATURE (artefact signé uniquement) ---
    if contexte.signe {
        doc.push(elements::Break::new(2));
        let mut cachet = elements::Paragraph::new(format!(
            "Validé et signé par le bourgmestre de la commune de {} le {}",
            contexte.commune.nom,
            chrono::Utc::now().format("%d/%m/%Y")
        ));
        cachet.set_alignment(Alignment::Right);
        doc.push(cachet.styled(style::Style::new().bold().italic()));
    } else {
        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new("Document provisoire, en attente de signature")
                .styled(style::Style::new().italic().with_font_size(8)),
        );
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(|e| {
        tracing::error!("Erreur de rendu PDF: {e}");
        AppError::RenderFailed
    })?;

    Ok(buffer)
}
