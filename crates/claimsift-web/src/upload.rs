use axum::extract::Multipart;

/// An uploaded PDF with its raw bytes.
pub struct UploadedPdf {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parse a multipart form upload into an [`UploadedPdf`].
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedPdf, String> {
    let mut file: Option<UploadedPdf> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "pdf" => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();

                validate_pdf(&data)?;

                file = Some(UploadedPdf { filename, data });
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    let file = file.ok_or("No file uploaded")?;
    Ok(file)
}

/// Verify the PDF magic bytes before anything is sent to GROBID.
fn validate_pdf(data: &[u8]) -> Result<(), String> {
    if !data.starts_with(b"%PDF-") {
        return Err("Uploaded file doesn't appear to be a valid PDF".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_accepted() {
        assert!(validate_pdf(b"%PDF-1.7 rest of file").is_ok());
    }

    #[test]
    fn other_bytes_rejected() {
        let err = validate_pdf(b"<html>not a pdf</html>").unwrap_err();
        assert_eq!(err, "Uploaded file doesn't appear to be a valid PDF");
    }
}
