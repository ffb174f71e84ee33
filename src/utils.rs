use image::{ GrayImage, ImageBuffer, Luma };
use imageproc::filter;


/// Sigma for a gaussian of side `size`, the same rule opencv uses when sigma is left at 0
pub fn gaussian_sigma(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-d gaussian of odd length `size`
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(size);
    let center = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size).map(|i| {
        let d = i as f32 - center;
        (-(d * d) / (2.0 * sigma * sigma)).exp()
    }).collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= sum);
    kernel
}

/// Gaussian blur with a fixed square kernel, run separably
pub fn gaussian_blur_fixed(img: &GrayImage, size: u32) -> GrayImage {
    filter::separable_filter_equal(img, &gaussian_kernel(size))
}

/// Histogram equalization that stretches the darkest populated level to 0
/// and the brightest to 255. A single level image is returned as is.
pub fn equalize_hist(img: &GrayImage) -> GrayImage {
    let mut vec = img.to_vec();
    let len = vec.len();

    // distribution
    let mut df = [0usize; 256];
    for v in &vec {
        df[*v as usize] += 1;
    }
    // cdf
    let mut temp = df[0];
    df.iter_mut().skip(1).for_each(|v| {
        *v = *v + temp;
        temp = *v;
    });
    let cdf_min = match df.iter().find(|v| **v != 0) {
        Some(min) => *min,
        None => return img.clone(),
    };
    if len == cdf_min {
        return img.clone();
    }
    vec.iter_mut().for_each(|v| {
        let x = df[*v as usize] - cdf_min;
        let y = len - cdf_min;
        *v = ((x as f32 / y as f32) * 255.0).round() as u8;
    });
    let image_buffer: Option<ImageBuffer<Luma<u8>, Vec<u8>>> = ImageBuffer::from_raw(img.width(), img.height(), vec);
    image_buffer.unwrap_or_else(|| img.clone())
}


#[cfg(test)]
mod test {

    use image::{ GrayImage, Luma };

    use super::{ equalize_hist, gaussian_blur_fixed, gaussian_kernel, gaussian_sigma };

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        assert!((gaussian_sigma(5) - 1.1).abs() < 1e-6);
        let kernel = gaussian_kernel(5);
        assert_eq!(kernel.len(), 5);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);
    }

    #[test]
    fn blur_keeps_flat_image_flat() {
        let img = GrayImage::from_pixel(7, 5, Luma([90]));
        let blurred = gaussian_blur_fixed(&img, 5);
        assert_eq!(blurred.dimensions(), (7, 5));
        let first = blurred.get_pixel(0, 0).0[0];
        assert!(blurred.pixels().all(|p| p.0[0] == first));
        assert!((first as i32 - 90).abs() <= 1);
    }

    #[test]
    fn blur_softens_a_step() {
        let mut img = GrayImage::new(10, 10);
        for y in 0..10 {
            for x in 5..10 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let blurred = gaussian_blur_fixed(&img, 5);
        let left = blurred.get_pixel(4, 5).0[0];
        let right = blurred.get_pixel(5, 5).0[0];
        assert!(left > 0 && left < 128);
        assert!(right > 128 && right < 255);
    }

    #[test]
    fn equalize_spans_full_range() {
        let mut img = GrayImage::from_pixel(4, 4, Luma([60]));
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([140]));
        let eq = equalize_hist(&img);
        assert_eq!(eq.get_pixel(3, 3).0[0], 0);
        assert_eq!(eq.get_pixel(1, 0).0[0], 255);
        let mid = eq.get_pixel(0, 0).0[0];
        assert!(mid > 0 && mid < 255);
    }

    #[test]
    fn equalize_uniform_is_noop() {
        let img = GrayImage::from_pixel(3, 3, Luma([42]));
        assert_eq!(equalize_hist(&img), img);
    }
}
